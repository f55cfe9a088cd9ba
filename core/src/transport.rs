//! Executes signed requests against the network.
//!
//! # Design
//! `Transport` is the single I/O seam of the crate. The default
//! `UreqTransport` wraps a blocking ureq agent configured so that 4xx/5xx
//! responses come back as data instead of errors; only failures that never
//! produced a response are reported as `TransportError`.

use std::io::ErrorKind;
use std::time::Duration;

use ureq::Agent;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Largest response body read into memory; ureq defaults to 10 MB.
pub const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

/// Performs one HTTP round trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
///
/// The timeout bounds the whole exchange, connect through body read.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            ..
        } = request;

        let result = match (method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &headers).call(),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(&url), &headers).call(),
            (HttpMethod::Delete, Some(body)) => {
                with_headers(self.agent.delete(&url).force_send_body(), &headers)
                    .send(body.as_bytes())
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&url), &headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&url), &headers).send_empty(),
            (HttpMethod::Patch, Some(body)) => {
                with_headers(self.agent.patch(&url), &headers).send(body.as_bytes())
            }
            (HttpMethod::Patch, None) => {
                with_headers(self.agent.patch(&url), &headers).send_empty()
            }
        };

        let mut response = result.map_err(into_transport_error)?;
        let status = response.status().as_u16();
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_vec()
            .map_err(into_transport_error)?;

        Ok(HttpResponse::new(status, String::from_utf8_lossy(&bytes)))
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn into_transport_error(err: ureq::Error) -> TransportError {
    TransportError::new(classify(&err), err.to_string())
}

fn classify(err: &ureq::Error) -> TransportErrorKind {
    match err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::HostNotFound => TransportErrorKind::HostNotFound,
        ureq::Error::ConnectionFailed => TransportErrorKind::ConnectionFailed,
        ureq::Error::Tls(_) => TransportErrorKind::Tls,
        ureq::Error::Io(io) => match io.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => TransportErrorKind::Timeout,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected => TransportErrorKind::ConnectionFailed,
            _ => TransportErrorKind::Io,
        },
        ureq::Error::Http(_) | ureq::Error::BadUri(_) => TransportErrorKind::InvalidRequest,
        _ => TransportErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_io_errors() {
        let refused = ureq::Error::Io(std::io::Error::from(ErrorKind::ConnectionRefused));
        assert_eq!(classify(&refused), TransportErrorKind::ConnectionFailed);

        let timed_out = ureq::Error::Io(std::io::Error::from(ErrorKind::TimedOut));
        assert_eq!(classify(&timed_out), TransportErrorKind::Timeout);

        let other = ureq::Error::Io(std::io::Error::other("boom"));
        assert_eq!(classify(&other), TransportErrorKind::Io);
    }

    #[test]
    fn classifies_dns_failure() {
        assert_eq!(
            classify(&ureq::Error::HostNotFound),
            TransportErrorKind::HostNotFound
        );
    }

    #[test]
    fn unroutable_url_is_a_transport_error() {
        let transport = UreqTransport::new(Duration::from_secs(2));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: "not a url".to_string(),
                path: "/".to_string(),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(!err.message.is_empty());
    }
}
