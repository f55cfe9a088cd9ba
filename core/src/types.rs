//! Request payloads for the Zenzap API.
//!
//! # Design
//! Each write operation has an explicit options record. Field order is the
//! order keys appear in the JSON body, and every optional field carries its
//! own inclusion rule:
//! - free-text optionals (`description`, `external_id`, `assignee`) are
//!   skipped when `None` **or** empty;
//! - `CreateTask::due_date` and the `UpdateTopic` fields are skipped only
//!   when `None`, so `Some(0)` and `Some("")` are sent.
//!
//! Response payloads are deliberately untyped (`serde_json::Value`); the
//! remote schema is not owned by this crate.

use serde::Serialize;

/// Documented server-side limits. The client does not enforce them.
pub mod limits {
    pub const TOPIC_NAME_MAX: usize = 64;
    pub const DESCRIPTION_MAX: usize = 10_000;
    pub const MESSAGE_TEXT_MAX: usize = 10_000;
    pub const TASK_TITLE_MAX: usize = 256;
    pub const EXTERNAL_ID_MAX: usize = 100;
    pub const MEMBER_IDS_PER_CALL_MAX: usize = 5;
}

pub const DEFAULT_PAGE_LIMIT: u32 = 50;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Pagination parameters for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub cursor: Option<String>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            cursor: None,
        }
    }
}

impl Page {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Body of `POST /v2/topics`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopic {
    pub name: String,
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub external_id: Option<String>,
}

impl CreateTopic {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
            description: None,
            external_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

/// Body of `PATCH /v2/topics/{id}`. Only provided fields are sent.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct UpdateTopic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of the `/v2/topics/{id}/members` mutations.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemberIds {
    pub member_ids: Vec<String>,
}

/// Body of `POST /v2/messages`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub topic_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub external_id: Option<String>,
}

impl SendMessage {
    pub fn new(topic_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            text: text.into(),
            external_id: None,
        }
    }

    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

/// Body of `POST /v2/tasks`. `due_date` is a Unix timestamp in milliseconds.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub topic_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(skip_serializing_if = "is_blank")]
    pub external_id: Option<String>,
}

impl CreateTask {
    pub fn new(topic_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            title: title.into(),
            description: None,
            assignee: None,
            due_date: None,
            external_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn due_date(mut self, due_date_ms: i64) -> Self {
        self.due_date = Some(due_date_ms);
        self
    }

    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}
