//! Best-effort cleanup of topics created by the demo commands.
//!
//! The public API has no delete endpoints for topics, messages or tasks, so
//! cleanup means the bot leaves every demo topic it is still a member of.

use anyhow::{bail, Result};
use serde_json::Value;
use tracing::{info, warn};
use zenzap_core::{Page, Transport, ZenzapClient};

const DEMO_PREFIXES: [&str; 7] = [
    "Quickstart Demo ",
    "Regular Topic ",
    "Project Updates Channel",
    "Updated Topic Name ",
    "Message Demo ",
    "Task Demo ",
    "Q1 2024 Product Launch",
];

#[derive(Debug, Clone, Copy)]
pub struct CleanupOptions {
    pub apply: bool,
    pub limit: u32,
    pub max_pages: u32,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub total_topics: usize,
    pub demo_topics: usize,
    pub bot_member: usize,
    pub left: usize,
    pub skipped_not_member: usize,
    pub failed: usize,
}

/// Topics and next cursor from a list payload. Accepts a bare array, or an
/// object keyed by `topics`/`data` with `nextCursor`/`cursor`.
pub fn parse_topics_payload(payload: &Value) -> (Vec<Value>, Option<String>) {
    match payload {
        Value::Array(topics) => (topics.clone(), None),
        Value::Object(map) => {
            let topics = map
                .get("topics")
                .filter(|v| !v.is_null())
                .or_else(|| map.get("data"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let cursor = map
                .get("nextCursor")
                .filter(|v| !v.is_null())
                .or_else(|| map.get("cursor"))
                .and_then(Value::as_str)
                .map(str::to_string);
            (topics, cursor)
        }
        _ => (Vec::new(), None),
    }
}

pub fn is_demo_topic(topic: &Value) -> bool {
    let name = text_field(topic, "name");
    let description = text_field(topic, "description").to_lowercase();
    let external_id = text_field(topic, "externalId");

    DEMO_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
        || external_id.contains("project-")
        || description.contains("quickstart example")
        || description.contains("project integration")
}

fn text_field<'a>(topic: &'a Value, key: &str) -> &'a str {
    topic.get(key).and_then(Value::as_str).unwrap_or("").trim()
}

/// Walks list pages until the cursor runs out, repeats, or `max_pages` is hit.
pub fn collect_topics<T: Transport>(
    client: &ZenzapClient<T>,
    limit: u32,
    max_pages: u32,
) -> Result<Vec<Value>> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    for page_no in 1..=max_pages {
        let page = Page {
            limit,
            cursor: cursor.clone(),
        };
        let response = client.list_topics(&page);
        if !response.is_success() {
            bail!("list_topics failed on page {page_no}: {}", response.data());
        }

        let (topics, next) = parse_topics_payload(response.data());
        println!("Listed page {page_no}: {} topics", topics.len());
        all.extend(topics);

        match next {
            Some(next) if !next.is_empty() && Some(&next) != cursor.as_ref() => {
                cursor = Some(next);
            }
            _ => return Ok(all),
        }
    }

    println!("Reached --max-pages ({max_pages}); stopping pagination.");
    Ok(all)
}

pub fn run<T: Transport>(client: &ZenzapClient<T>, opts: CleanupOptions) -> Result<CleanupSummary> {
    let me = client.get_current_member();
    if !me.is_success() {
        bail!("failed to authenticate bot: {}", me.data());
    }
    let Some(bot_id) = me.str_field("id").map(str::to_string) else {
        bail!("bot id missing from /v2/members/me response");
    };

    let mode = if opts.apply { "APPLY" } else { "DRY-RUN" };
    println!("{}", "=".repeat(60));
    println!("Demo Topic Cleanup ({mode})");
    println!("{}", "=".repeat(60));
    println!("Bot ID: {bot_id}");
    println!("Base URL: {}", client.base_url());

    let topics = collect_topics(client, opts.limit, opts.max_pages)?;
    let demo: Vec<&Value> = topics.iter().filter(|t| is_demo_topic(t)).collect();
    let mut summary = CleanupSummary {
        total_topics: topics.len(),
        demo_topics: demo.len(),
        ..CleanupSummary::default()
    };
    println!(
        "\nFound {} demo topic(s) out of {} total.",
        summary.demo_topics, summary.total_topics
    );

    for topic in demo {
        let topic_id = topic.get("id").and_then(Value::as_str).unwrap_or("");
        let name = topic.get("name").and_then(Value::as_str).unwrap_or("(unnamed)");
        let is_member = topic
            .get("members")
            .and_then(Value::as_array)
            .is_some_and(|members| members.iter().any(|m| m.as_str() == Some(bot_id.as_str())));

        println!("\n- Topic: {name} ({topic_id})");
        if !is_member {
            summary.skipped_not_member += 1;
            println!("  Skip: bot is not a member of this topic");
            continue;
        }
        summary.bot_member += 1;
        if !opts.apply {
            println!("  Would remove bot from topic");
            continue;
        }

        let response = client.remove_topic_members(topic_id, &[bot_id.clone()]);
        if response.is_success() {
            summary.left += 1;
            info!(topic_id, "left demo topic");
            println!("  Bot removed successfully");
        } else {
            summary.failed += 1;
            warn!(topic_id, status = response.status(), "failed to leave demo topic");
            println!("  Remove bot failed: {}", response.data());
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("Cleanup Summary");
    println!("{}", "=".repeat(60));
    println!("Mode: {mode}");
    println!("Demo topics matched: {}", summary.demo_topics);
    println!("Topics where bot is member: {}", summary.bot_member);
    println!("Topics left by bot: {}", summary.left);
    println!("Topics skipped (bot not member): {}", summary.skipped_not_member);
    println!("Topics with failures: {}", summary.failed);
    if !opts.apply {
        println!("\nDry-run only. Re-run with --apply to perform changes.");
    }

    Ok(summary)
}
