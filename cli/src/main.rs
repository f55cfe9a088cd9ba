mod cleanup;
mod quickstart;
mod settings;

use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zenzap_core::{ApiResponse, Page, DEFAULT_BASE_URL};

use crate::cleanup::CleanupOptions;
use crate::settings::{parse_member_ids, ConnectionArgs};

#[derive(Parser, Debug)]
#[command(name = "zenzap")]
#[command(about = "Command-line companion for the Zenzap external integration API")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log every request and response at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the bot identity behind the credentials.
    Me,
    /// List organization members, following the cursor.
    Members(ListArgs),
    /// List topics the bot belongs to, following the cursor.
    Topics(ListArgs),
    /// Create a demo topic with a message and a task.
    Quickstart(QuickstartArgs),
    /// Leave demo topics created by `quickstart`. Dry-run unless --apply.
    Cleanup(CleanupArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(long, default_value_t = 50)]
    limit: u32,
    #[arg(long, default_value_t = 1)]
    max_pages: u32,
}

#[derive(Args, Debug)]
struct QuickstartArgs {
    /// Comma-separated member ids; the first one is assigned the task.
    #[arg(long, env = "MEMBER_IDS", default_value = "")]
    member_ids: String,
}

#[derive(Args, Debug)]
struct CleanupArgs {
    /// Apply changes. Default mode is dry-run.
    #[arg(long)]
    apply: bool,
    /// Page size for topic listing.
    #[arg(long, default_value_t = 100)]
    limit: u32,
    /// Safety limit on pagination depth.
    #[arg(long, default_value_t = 20)]
    max_pages: u32,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "zenzap=debug,zenzap_core=debug,warn"
    } else {
        "zenzap=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let client = cli.connection.client()?;
    if client.base_url() != DEFAULT_BASE_URL {
        tracing::info!(base_url = client.base_url(), "using custom API host");
    }

    match cli.command {
        Commands::Me => {
            let me = client.get_current_member();
            print_json(&me)?;
            Ok(exit_code(&me))
        }
        Commands::Members(args) => {
            walk_pages(args, "members", |page| client.list_members(page))
        }
        Commands::Topics(args) => walk_pages(args, "topics", |page| client.list_topics(page)),
        Commands::Quickstart(args) => {
            let report = quickstart::run(&client, &parse_member_ids(&args.member_ids))?;
            tracing::info!(
                topic_id = %report.topic_id,
                message_id = ?report.message_id,
                task_id = ?report.task_id,
                "quickstart finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::Cleanup(args) => {
            let summary = cleanup::run(
                &client,
                CleanupOptions {
                    apply: args.apply,
                    limit: args.limit,
                    max_pages: args.max_pages,
                },
            )?;
            if args.apply && summary.failed > 0 {
                return Ok(ExitCode::from(1));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints each page's items under `key` until the cursor runs out.
fn walk_pages(
    args: ListArgs,
    key: &str,
    mut fetch: impl FnMut(&Page) -> ApiResponse,
) -> Result<ExitCode> {
    let mut page = Page::with_limit(args.limit);
    for _ in 0..args.max_pages.max(1) {
        let response = fetch(&page);
        if !response.is_success() {
            print_json(&response)?;
            return Ok(exit_code(&response));
        }
        let items = response.data()[key].as_array().cloned().unwrap_or_default();
        for item in &items {
            println!(
                "{}\t{}",
                item["id"].as_str().unwrap_or("?"),
                item["name"].as_str().unwrap_or("(unnamed)")
            );
        }
        match response.str_field("nextCursor") {
            Some(next) if !next.is_empty() && page.cursor.as_deref() != Some(next) => {
                page.cursor = Some(next.to_string());
            }
            _ => break,
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_json(response: &ApiResponse) -> Result<()> {
    let rendered = serde_json::to_string_pretty(response.data())?;
    if response.is_success() {
        println!("{rendered}");
        Ok(())
    } else if response.is_transport_failure() {
        bail!("request failed: {rendered}")
    } else {
        eprintln!("HTTP {}", response.status());
        println!("{rendered}");
        Ok(())
    }
}

fn exit_code(response: &ApiResponse) -> ExitCode {
    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
