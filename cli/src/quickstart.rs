//! Walkthrough of the basic operations: identify the bot, create a topic,
//! post a message, and open a task on it.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use zenzap_core::{ApiResponse, CreateTask, CreateTopic, SendMessage, Transport, ZenzapClient};

const TASK_DUE_IN: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Ids of what the walkthrough created.
#[derive(Debug)]
pub struct QuickstartReport {
    pub topic_id: String,
    pub message_id: Option<String>,
    pub task_id: Option<String>,
}

pub fn run<T: Transport>(client: &ZenzapClient<T>, member_ids: &[String]) -> Result<QuickstartReport> {
    if member_ids.is_empty() {
        bail!("no member ids configured; set MEMBER_IDS or pass --member-ids");
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the Unix epoch")?;

    println!("{}", "=".repeat(60));
    println!("Zenzap API Quickstart");
    println!("{}", "=".repeat(60));

    println!("\n1. Getting bot information...");
    let me = client.get_current_member();
    if !me.is_success() {
        bail!("{}", describe_failure(&me));
    }
    println!("   Bot ID: {}", me.str_field("id").unwrap_or("?"));
    println!("   Name: {}", me.str_field("name").unwrap_or("?"));
    println!("   Status: {}", me.str_field("status").unwrap_or("?"));

    println!("\n2. Creating a topic...");
    let topic = client.create_topic(
        &CreateTopic::new(
            format!("Quickstart Demo {}", now.as_secs()),
            member_ids.iter().take(2).cloned(),
        )
        .description("Topic created by the quickstart example"),
    );
    if !topic.is_success() {
        bail!("{}", describe_failure(&topic));
    }
    let Some(topic_id) = topic.str_field("id").map(str::to_string) else {
        bail!("topic id missing from create response: {}", topic.data());
    };
    println!("   Topic ID: {topic_id}");
    println!("   Name: {}", topic.str_field("name").unwrap_or("?"));

    println!("\n3. Sending a message...");
    let message = client.send_message(&SendMessage::new(
        topic_id.as_str(),
        "Hello from the Zenzap API quickstart example!",
    ));
    let message_id = report_created(&message);

    println!("\n4. Creating a task...");
    let due = (now + TASK_DUE_IN).as_millis() as i64;
    let task = client.create_task(
        &CreateTask::new(topic_id.as_str(), "Review quickstart example")
            .description("Check that the API integration is working correctly")
            .assignee(member_ids[0].as_str())
            .due_date(due),
    );
    let task_id = report_created(&task);

    println!("\n{}", "=".repeat(60));
    println!("Quickstart complete!");
    println!("{}", "=".repeat(60));

    Ok(QuickstartReport {
        topic_id,
        message_id,
        task_id,
    })
}

fn report_created(response: &ApiResponse) -> Option<String> {
    if response.is_success() {
        let id = response.str_field("id").map(str::to_string);
        println!("   Created: {}", id.as_deref().unwrap_or("?"));
        id
    } else {
        println!("   Error: {}", describe_failure(response));
        None
    }
}

fn describe_failure(response: &ApiResponse) -> String {
    if response.is_transport_failure() {
        format!(
            "request failed ({}): {}",
            response.data()["type"].as_str().unwrap_or("unknown"),
            response.data()["error"].as_str().unwrap_or("")
        )
    } else {
        format!("HTTP {} - {}", response.status(), response.data())
    }
}

#[cfg(test)]
mod tests {
    use zenzap_core::{ClientConfig, Credentials, HttpRequest, HttpResponse, TransportError};

    use super::*;

    struct Refusing;

    impl Transport for Refusing {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::new(
                zenzap_core::TransportErrorKind::ConnectionFailed,
                "connection refused",
            ))
        }
    }

    fn client() -> ZenzapClient<Refusing> {
        ZenzapClient::with_transport(Credentials::new("k", "s"), ClientConfig::default(), Refusing)
    }

    #[test]
    fn requires_member_ids() {
        let err = run(&client(), &[]).unwrap_err();
        assert!(err.to_string().contains("MEMBER_IDS"));
    }

    #[test]
    fn transport_failure_stops_the_walkthrough() {
        let err = run(&client(), &["m-1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("ConnectionFailed"));
    }

    #[test]
    fn describes_http_failures_with_status() {
        let resp = ApiResponse::from_http(HttpResponse::new(403, r#"{"error":"forbidden"}"#));
        assert_eq!(describe_failure(&resp), r#"HTTP 403 - {"error":"forbidden"}"#);
    }
}
