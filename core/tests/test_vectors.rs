//! Verify request building and response normalization against the JSON
//! vectors stored in `test-vectors/`.
//!
//! Request vectors pin the exact signed path, the exact body bytes and the
//! expected `X-Signature`; comparing raw strings here is intentional, since
//! the signature is computed over those bytes.

use serde_json::Value;
use zenzap_core::{
    ApiError, ApiResponse, ClientConfig, CreateTask, CreateTopic, Credentials, HttpMethod,
    HttpRequest, HttpResponse, Page, SendMessage, Transport, TransportError, UpdateTopic,
    ZenzapClient,
};

/// Build-only tests never reach the network.
struct Unreachable;

impl Transport for Unreachable {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        panic!("test vectors must not send requests");
    }
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn str_field(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

fn required(input: &Value, key: &str) -> String {
    str_field(input, key).unwrap_or_else(|| panic!("missing {key}"))
}

fn string_list(input: &Value, key: &str) -> Vec<String> {
    input[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

fn page(input: &Value) -> Page {
    Page {
        limit: input["limit"].as_u64().unwrap() as u32,
        cursor: str_field(input, "cursor"),
    }
}

fn build(
    client: &ZenzapClient<Unreachable>,
    operation: &str,
    input: &Value,
) -> Result<HttpRequest, ApiError> {
    match operation {
        "get_current_member" => Ok(client.build_get_current_member()),
        "list_members" => Ok(client.build_list_members(&page(input))),
        "list_topics" => Ok(client.build_list_topics(&page(input))),
        "get_topic" => Ok(client.build_get_topic(&required(input, "topic_id"))),
        "get_topic_by_external_id" => {
            Ok(client.build_get_topic_by_external_id(&required(input, "external_id")))
        }
        "create_topic" => client.build_create_topic(&CreateTopic {
            name: required(input, "name"),
            members: string_list(input, "members"),
            description: str_field(input, "description"),
            external_id: str_field(input, "external_id"),
        }),
        "update_topic" => client.build_update_topic(
            &required(input, "topic_id"),
            &UpdateTopic {
                name: str_field(input, "name"),
                description: str_field(input, "description"),
            },
        ),
        "add_topic_members" => client.build_add_topic_members(
            &required(input, "topic_id"),
            &string_list(input, "member_ids"),
        ),
        "remove_topic_members" => client.build_remove_topic_members(
            &required(input, "topic_id"),
            &string_list(input, "member_ids"),
        ),
        "send_message" => client.build_send_message(&SendMessage {
            topic_id: required(input, "topic_id"),
            text: required(input, "text"),
            external_id: str_field(input, "external_id"),
        }),
        "create_task" => client.build_create_task(&CreateTask {
            topic_id: required(input, "topic_id"),
            title: required(input, "title"),
            description: str_field(input, "description"),
            assignee: str_field(input, "assignee"),
            due_date: input.get("due_date").and_then(Value::as_i64),
            external_id: str_field(input, "external_id"),
        }),
        other => panic!("unknown operation: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    let client = ZenzapClient::with_transport(
        Credentials::new(
            vectors["api_key"].as_str().unwrap(),
            vectors["secret"].as_str().unwrap(),
        ),
        ClientConfig::default().base_url(base_url),
        Unreachable,
    );
    let bearer = format!("Bearer {}", vectors["api_key"].as_str().unwrap());

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = &case["expected_request"];
        let req = build(&client, case["operation"].as_str().unwrap(), &case["input"]).unwrap();

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.path, expected["path"].as_str().unwrap(), "{name}: path");
        assert_eq!(req.url, format!("{base_url}{}", req.path), "{name}: url");
        assert_eq!(req.body.as_deref(), expected["body"].as_str(), "{name}: body");
        assert_eq!(
            req.header("X-Signature"),
            expected["signature"].as_str(),
            "{name}: signature"
        );
        assert_eq!(req.header("Authorization"), Some(bearer.as_str()), "{name}: bearer");

        let content_type = req.header("Content-Type");
        if req.body.is_some() {
            assert_eq!(content_type, Some("application/json"), "{name}: content type");
        } else {
            assert_eq!(content_type, None, "{name}: content type");
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let status = case["status"].as_u64().unwrap() as u16;
        let resp = ApiResponse::from_http(HttpResponse::new(
            status,
            case["body"].as_str().unwrap(),
        ));

        assert_eq!(resp.status(), status, "{name}: status");
        assert_eq!(
            resp.is_success(),
            case["expected_success"].as_bool().unwrap(),
            "{name}: success"
        );
        assert_eq!(resp.data(), &case["expected_data"], "{name}: data");
    }
}
