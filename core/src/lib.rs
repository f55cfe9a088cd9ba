//! Blocking client for the Zenzap external integration API.
//!
//! # Overview
//! Builds Bearer-authenticated, HMAC-SHA256-signed requests for members,
//! topics, messages and tasks, sends them, and normalizes every outcome into
//! an `ApiResponse` carrying status, decoded JSON and a success flag.
//!
//! # Design
//! - `ZenzapClient` holds credentials, base URL, timeout and a `Transport`;
//!   nothing is mutated after construction.
//! - Each operation has a pure `build_*` half producing a signed
//!   `HttpRequest`, so the signed bytes can be inspected without I/O.
//! - Bodiless requests sign the path and query; requests with a body sign the
//!   compact JSON that is actually transmitted.
//! - HTTP errors and transport failures are values, never `Err` or panics.
//!   Transport failures use status 0.
//! - One round trip per call. No retries, no hidden pagination.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod response;
pub mod signing;
pub mod transport;
pub mod types;

pub use client::ZenzapClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, TransportError, TransportErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::ApiResponse;
pub use signing::Credentials;
pub use transport::{Transport, UreqTransport};
pub use types::{CreateTask, CreateTopic, MemberIds, Page, SendMessage, UpdateTopic};
