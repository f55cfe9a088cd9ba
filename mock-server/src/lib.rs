//! In-memory stand-in for the Zenzap external integration API.
//!
//! Serves every endpoint the client talks to, checks the Bearer token and
//! HMAC signature of each request, and applies the documented field limits
//! that the real service advertises.

pub mod auth;

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "mock-api-key";
pub const DEFAULT_SECRET: &str = "mock-secret";
pub const BOT_ID: &str = "00000000-0000-0000-0000-00000000b071";

/// Members every fresh server knows besides the bot.
pub const SEED_MEMBER_IDS: [&str; 3] = [
    "00000000-0000-0000-0000-000000000001",
    "00000000-0000-0000-0000-000000000002",
    "00000000-0000-0000-0000-000000000003",
];

const TOPIC_NAME_MAX: usize = 64;
const DESCRIPTION_MAX: usize = 10_000;
const TASK_TITLE_MAX: usize = 256;
const EXTERNAL_ID_MAX: usize = 100;
const MEMBER_IDS_PER_CALL_MAX: usize = 5;
const DEFAULT_PAGE_LIMIT: usize = 50;

/// Credentials the server accepts.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub api_key: String,
    pub secret: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            secret: DEFAULT_SECRET.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub members: Vec<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    pub created_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub topic_id: String,
    pub text: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub created_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub topic_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub external_id: Option<String>,
    pub created_at: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTopic {
    name: String,
    members: Vec<String>,
    description: Option<String>,
    external_id: Option<String>,
}

#[derive(Deserialize)]
struct UpdateTopic {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberIds {
    member_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessage {
    topic_id: String,
    text: String,
    external_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTask {
    topic_id: String,
    title: String,
    description: Option<String>,
    assignee: Option<String>,
    due_date: Option<i64>,
    external_id: Option<String>,
}

#[derive(Deserialize)]
struct ListParams {
    limit: Option<usize>,
    cursor: Option<String>,
}

#[derive(Default)]
pub struct Db {
    pub members: Vec<Member>,
    pub topics: Vec<Topic>,
    pub messages: Vec<Message>,
    pub tasks: Vec<Task>,
}

impl Db {
    fn seeded() -> Self {
        let mut members = vec![Member {
            id: BOT_ID.to_string(),
            name: "Mock Bot".to_string(),
            email: "bot@mock.zenzap.local".to_string(),
            status: "active".to_string(),
        }];
        members.extend(SEED_MEMBER_IDS.iter().enumerate().map(|(i, id)| Member {
            id: id.to_string(),
            name: format!("Member {}", i + 1),
            email: format!("member{}@mock.zenzap.local", i + 1),
            status: "active".to_string(),
        }));
        Self {
            members,
            ..Self::default()
        }
    }

    fn is_member(&self, id: &str) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Topic the bot can see: it must still be a member.
    fn visible_topic_mut(&mut self, id: &str) -> Result<&mut Topic, ErrorResponse> {
        self.topics
            .iter_mut()
            .find(|t| t.id == id && t.members.iter().any(|m| m == BOT_ID))
            .ok_or_else(|| ErrorResponse::not_found("topic not found"))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MockConfig>,
    pub db: Arc<RwLock<Db>>,
}

/// JSON error body `{"error": message}` with a status code.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ErrorResponse {
    status: StatusCode,
    message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ErrorResponse>;

pub fn app() -> Router {
    app_with_config(MockConfig::default())
}

pub fn app_with_config(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(RwLock::new(Db::seeded())),
    };
    Router::new()
        .route("/v2/members/me", get(current_member))
        .route("/v2/members", get(list_members))
        .route("/v2/topics", get(list_topics).post(create_topic))
        .route("/v2/topics/external/{external_id}", get(get_topic_by_external_id))
        .route("/v2/topics/{id}", get(get_topic).patch(update_topic))
        .route(
            "/v2/topics/{id}/members",
            post(add_topic_members).delete(remove_topic_members),
        )
        .route("/v2/messages", post(send_message))
        .route("/v2/tasks", post(create_task))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_signature,
        ))
        .with_state(state)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "mock Zenzap API listening");
    }
    axum::serve(listener, app_with_config(config)).await
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn check_len(field: &str, value: &str, max: usize) -> ApiResult<()> {
    if value.chars().count() > max {
        return Err(ErrorResponse::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn check_member_ids(ids: &[String]) -> ApiResult<()> {
    if ids.is_empty() || ids.len() > MEMBER_IDS_PER_CALL_MAX {
        return Err(ErrorResponse::bad_request(format!(
            "memberIds must contain 1 to {MEMBER_IDS_PER_CALL_MAX} ids"
        )));
    }
    Ok(())
}

/// Offset-based page with an opaque `nextCursor`.
fn paginate<T: Clone>(items: &[T], params: &ListParams) -> ApiResult<(Vec<T>, Option<String>)> {
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
    let offset = match params.cursor.as_deref() {
        None | Some("") => 0,
        Some(cursor) => cursor
            .parse::<usize>()
            .map_err(|_| ErrorResponse::bad_request("invalid cursor"))?,
    };
    let page: Vec<T> = items.iter().skip(offset).take(limit).cloned().collect();
    let next = offset + page.len();
    let next_cursor = (next < items.len()).then(|| next.to_string());
    Ok((page, next_cursor))
}

// --- members ---

async fn current_member(State(state): State<AppState>) -> ApiResult<Json<Member>> {
    let db = state.db.read().await;
    db.members
        .iter()
        .find(|m| m.id == BOT_ID)
        .cloned()
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("bot member missing"))
}

async fn list_members(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let db = state.db.read().await;
    let (members, next_cursor) = paginate(&db.members, &params)?;
    Ok(Json(json!({ "members": members, "nextCursor": next_cursor })))
}

// --- topics ---

async fn create_topic(
    State(state): State<AppState>,
    Json(input): Json<CreateTopic>,
) -> ApiResult<(StatusCode, Json<Topic>)> {
    if input.name.is_empty() {
        return Err(ErrorResponse::bad_request("name is required"));
    }
    check_len("name", &input.name, TOPIC_NAME_MAX)?;
    if input.members.is_empty() {
        return Err(ErrorResponse::bad_request("members must not be empty"));
    }
    if let Some(description) = &input.description {
        check_len("description", description, DESCRIPTION_MAX)?;
    }
    if let Some(external_id) = &input.external_id {
        check_len("externalId", external_id, EXTERNAL_ID_MAX)?;
    }

    let mut db = state.db.write().await;
    if let Some(unknown) = input.members.iter().find(|id| !db.is_member(id)) {
        return Err(ErrorResponse::bad_request(format!("unknown member {unknown}")));
    }

    let mut members = vec![BOT_ID.to_string()];
    for id in input.members {
        if !members.contains(&id) {
            members.push(id);
        }
    }
    let topic = Topic {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        description: input.description,
        members,
        external_id: input.external_id.map(|ext| format!("{BOT_ID}:{ext}")),
        created_at: now_ms(),
    };
    db.topics.push(topic.clone());
    Ok((StatusCode::CREATED, Json(topic)))
}

async fn get_topic(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Topic>> {
    let mut db = state.db.write().await;
    Ok(Json(db.visible_topic_mut(&id)?.clone()))
}

async fn get_topic_by_external_id(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> ApiResult<Json<Topic>> {
    let scoped = format!("{BOT_ID}:{external_id}");
    let db = state.db.read().await;
    db.topics
        .iter()
        .find(|t| {
            t.members.iter().any(|m| m == BOT_ID)
                && t
                    .external_id
                    .as_deref()
                    .is_some_and(|ext| ext == external_id || ext == scoped)
        })
        .cloned()
        .map(Json)
        .ok_or_else(|| ErrorResponse::not_found("topic not found"))
}

async fn list_topics(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let db = state.db.read().await;
    let visible: Vec<Topic> = db
        .topics
        .iter()
        .filter(|t| t.members.iter().any(|m| m == BOT_ID))
        .cloned()
        .collect();
    let (topics, next_cursor) = paginate(&visible, &params)?;
    Ok(Json(json!({ "topics": topics, "nextCursor": next_cursor })))
}

async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateTopic>,
) -> ApiResult<Json<Topic>> {
    if let Some(name) = &input.name {
        if name.is_empty() {
            return Err(ErrorResponse::bad_request("name must not be empty"));
        }
        check_len("name", name, TOPIC_NAME_MAX)?;
    }
    if let Some(description) = &input.description {
        check_len("description", description, DESCRIPTION_MAX)?;
    }

    let mut db = state.db.write().await;
    let topic = db.visible_topic_mut(&id)?;
    if let Some(name) = input.name {
        topic.name = name;
    }
    if let Some(description) = input.description {
        topic.description = Some(description);
    }
    Ok(Json(topic.clone()))
}

async fn add_topic_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MemberIds>,
) -> ApiResult<Json<Topic>> {
    check_member_ids(&input.member_ids)?;
    let mut db = state.db.write().await;
    if let Some(unknown) = input.member_ids.iter().find(|id| !db.is_member(id)) {
        return Err(ErrorResponse::bad_request(format!("unknown member {unknown}")));
    }
    let topic = db.visible_topic_mut(&id)?;
    for member in input.member_ids {
        if !topic.members.contains(&member) {
            topic.members.push(member);
        }
    }
    Ok(Json(topic.clone()))
}

async fn remove_topic_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<MemberIds>,
) -> ApiResult<Json<Topic>> {
    check_member_ids(&input.member_ids)?;
    let mut db = state.db.write().await;
    let topic = db.visible_topic_mut(&id)?;
    topic.members.retain(|m| !input.member_ids.contains(m));
    Ok(Json(topic.clone()))
}

// --- messages and tasks ---

async fn send_message(
    State(state): State<AppState>,
    Json(input): Json<SendMessage>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    if input.text.is_empty() {
        return Err(ErrorResponse::bad_request("text is required"));
    }
    check_len("text", &input.text, DESCRIPTION_MAX)?;
    if let Some(external_id) = &input.external_id {
        check_len("externalId", external_id, EXTERNAL_ID_MAX)?;
    }

    let mut db = state.db.write().await;
    db.visible_topic_mut(&input.topic_id)?;
    let message = Message {
        id: Uuid::new_v4().to_string(),
        topic_id: input.topic_id,
        text: input.text,
        external_id: input.external_id,
        created_at: now_ms(),
    };
    db.messages.push(message.clone());
    Ok((StatusCode::CREATED, Json(message)))
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if input.title.is_empty() {
        return Err(ErrorResponse::bad_request("title is required"));
    }
    check_len("title", &input.title, TASK_TITLE_MAX)?;
    if let Some(description) = &input.description {
        check_len("description", description, DESCRIPTION_MAX)?;
    }
    if let Some(external_id) = &input.external_id {
        check_len("externalId", external_id, EXTERNAL_ID_MAX)?;
    }

    let mut db = state.db.write().await;
    let topic = db.visible_topic_mut(&input.topic_id)?;
    if let Some(assignee) = &input.assignee {
        if !topic.members.contains(assignee) {
            return Err(ErrorResponse::bad_request("assignee must be a topic member"));
        }
    }
    let task = Task {
        id: Uuid::new_v4().to_string(),
        topic_id: input.topic_id,
        title: input.title,
        description: input.description,
        assignee: input.assignee,
        due_date: input.due_date,
        external_id: input.external_id,
        created_at: now_ms(),
    };
    db.tasks.push(task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}
