//! Signed request builder and resource operations for the Zenzap API.
//!
//! # Design
//! Every operation exists twice. `build_*` produces a signed `HttpRequest`
//! without touching the network; the resource method of the same name sends
//! it through the client's `Transport` and normalizes the outcome into an
//! `ApiResponse`. Resource methods never return `Err`: build failures and
//! transport failures both become status-0 responses, HTTP errors keep
//! their real status.
//!
//! The client holds no mutable state. Sharing one instance across threads is
//! fine as long as the transport is `Send + Sync`, which the trait requires.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest};
use crate::query::{encode_segment, Query};
use crate::response::ApiResponse;
use crate::signing::Credentials;
use crate::transport::{Transport, UreqTransport};
use crate::types::{CreateTask, CreateTopic, MemberIds, Page, SendMessage, UpdateTopic};

/// Blocking client for the Zenzap external integration API.
#[derive(Clone)]
pub struct ZenzapClient<T = UreqTransport> {
    credentials: Credentials,
    base_url: String,
    timeout: Duration,
    transport: T,
}

impl ZenzapClient<UreqTransport> {
    /// Client for the production host with the default 30 second timeout.
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::with_config(Credentials::new(api_key, secret), ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(credentials, config, transport)
    }
}

impl<T: Transport> ZenzapClient<T> {
    pub fn with_transport(credentials: Credentials, config: ClientConfig, transport: T) -> Self {
        Self {
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // -----------------------------------------------------------------------
    // Request builders
    // -----------------------------------------------------------------------

    pub fn build_get_current_member(&self) -> HttpRequest {
        self.build_read("/v2/members/me".to_string())
    }

    pub fn build_list_members(&self, page: &Page) -> HttpRequest {
        self.build_read(page_query(page).append_to("/v2/members"))
    }

    pub fn build_create_topic(&self, input: &CreateTopic) -> Result<HttpRequest, ApiError> {
        self.build_write(HttpMethod::Post, "/v2/topics".to_string(), input)
    }

    pub fn build_get_topic(&self, topic_id: &str) -> HttpRequest {
        self.build_read(format!("/v2/topics/{topic_id}"))
    }

    pub fn build_get_topic_by_external_id(&self, external_id: &str) -> HttpRequest {
        self.build_read(format!(
            "/v2/topics/external/{}",
            encode_segment(external_id)
        ))
    }

    pub fn build_list_topics(&self, page: &Page) -> HttpRequest {
        self.build_read(page_query(page).append_to("/v2/topics"))
    }

    pub fn build_update_topic(
        &self,
        topic_id: &str,
        input: &UpdateTopic,
    ) -> Result<HttpRequest, ApiError> {
        self.build_write(HttpMethod::Patch, format!("/v2/topics/{topic_id}"), input)
    }

    pub fn build_add_topic_members(
        &self,
        topic_id: &str,
        member_ids: &[String],
    ) -> Result<HttpRequest, ApiError> {
        self.build_write(
            HttpMethod::Post,
            format!("/v2/topics/{topic_id}/members"),
            &member_body(member_ids),
        )
    }

    pub fn build_remove_topic_members(
        &self,
        topic_id: &str,
        member_ids: &[String],
    ) -> Result<HttpRequest, ApiError> {
        self.build_write(
            HttpMethod::Delete,
            format!("/v2/topics/{topic_id}/members"),
            &member_body(member_ids),
        )
    }

    pub fn build_send_message(&self, input: &SendMessage) -> Result<HttpRequest, ApiError> {
        self.build_write(HttpMethod::Post, "/v2/messages".to_string(), input)
    }

    pub fn build_create_task(&self, input: &CreateTask) -> Result<HttpRequest, ApiError> {
        self.build_write(HttpMethod::Post, "/v2/tasks".to_string(), input)
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    /// The bot identity behind the credentials.
    pub fn get_current_member(&self) -> ApiResponse {
        self.send(Ok(self.build_get_current_member()))
    }

    pub fn list_members(&self, page: &Page) -> ApiResponse {
        self.send(Ok(self.build_list_members(page)))
    }

    // -----------------------------------------------------------------------
    // Topics
    // -----------------------------------------------------------------------

    /// Creates a topic. The bot is added as a member by the service.
    pub fn create_topic(&self, input: &CreateTopic) -> ApiResponse {
        self.send(self.build_create_topic(input))
    }

    pub fn get_topic(&self, topic_id: &str) -> ApiResponse {
        self.send(Ok(self.build_get_topic(topic_id)))
    }

    /// Looks a topic up by external id. Topics created by another bot need
    /// the scoped `botId:externalId` form. A 404 means unknown or not a member.
    pub fn get_topic_by_external_id(&self, external_id: &str) -> ApiResponse {
        self.send(Ok(self.build_get_topic_by_external_id(external_id)))
    }

    /// Topics the bot is a member of.
    pub fn list_topics(&self, page: &Page) -> ApiResponse {
        self.send(Ok(self.build_list_topics(page)))
    }

    pub fn update_topic(&self, topic_id: &str, input: &UpdateTopic) -> ApiResponse {
        self.send(self.build_update_topic(topic_id, input))
    }

    pub fn add_topic_members(&self, topic_id: &str, member_ids: &[String]) -> ApiResponse {
        self.send(self.build_add_topic_members(topic_id, member_ids))
    }

    pub fn remove_topic_members(&self, topic_id: &str, member_ids: &[String]) -> ApiResponse {
        self.send(self.build_remove_topic_members(topic_id, member_ids))
    }

    // -----------------------------------------------------------------------
    // Messages and tasks
    // -----------------------------------------------------------------------

    pub fn send_message(&self, input: &SendMessage) -> ApiResponse {
        self.send(self.build_send_message(input))
    }

    pub fn create_task(&self, input: &CreateTask) -> ApiResponse {
        self.send(self.build_create_task(input))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Bodiless request: the signed payload is the path with its query.
    fn build_read(&self, path: String) -> HttpRequest {
        let signature = self.credentials.sign(&path);
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{path}", self.base_url),
            headers: vec![
                ("Authorization".to_string(), self.credentials.bearer()),
                ("X-Signature".to_string(), signature),
            ],
            path,
            body: None,
        }
    }

    /// Request with a JSON body: the signed payload is the body itself.
    fn build_write<B: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body)?;
        let signature = self.credentials.sign(&body);
        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: vec![
                ("Authorization".to_string(), self.credentials.bearer()),
                ("X-Signature".to_string(), signature),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            path,
            body: Some(body),
        })
    }

    fn send(&self, request: Result<HttpRequest, ApiError>) -> ApiResponse {
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "failed to build request");
                return ApiResponse::from_transport_error(&TransportError::from(err));
            }
        };

        let method = request.method;
        let path = request.path.clone();
        debug!(%method, %path, "sending request");

        match self.transport.execute(request) {
            Ok(response) => {
                debug!(%method, %path, status = response.status, "received response");
                ApiResponse::from_http(response)
            }
            Err(err) => {
                warn!(%method, %path, kind = %err.kind, error = %err.message, "transport failure");
                ApiResponse::from_transport_error(&err)
            }
        }
    }
}

impl<T> fmt::Debug for ZenzapClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZenzapClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn page_query(page: &Page) -> Query {
    Query::new()
        .param("limit", page.limit)
        .opt_param("cursor", page.cursor.as_deref())
}

fn member_body(member_ids: &[String]) -> MemberIds {
    MemberIds {
        member_ids: member_ids.to_vec(),
    }
}
