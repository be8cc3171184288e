//! toolbridge: interactive front end for the orchestration engine.
//!
//! Reads one query per line from stdin, runs it through the engine and
//! prints the responses. All queries share one conversation. Providers are
//! shut down on EOF.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use toolbridge_core::{init_tracing, log_error, Engine, Logger, QueryRequest, TracingLogger};

#[derive(Parser)]
#[command(name = "toolbridge", about = "Chat with a model that can call MCP tools")]
struct Args {
    /// Provider config file (JSON or YAML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to use instead of the one named in the config.
    #[arg(short, long)]
    model: Option<String>,

    /// Continue an existing conversation id.
    #[arg(long)]
    conversation: Option<String>,

    /// Print each full response as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::with_component("cli"));

    let engine = match Engine::from_config_path(
        args.config.as_deref(),
        args.model.as_deref(),
        Arc::clone(&logger),
    )
    .await
    {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("toolbridge: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for failure in &engine.init_report().failed {
        eprintln!("provider {} unavailable: {}", failure.provider, failure.error);
    }
    eprintln!(
        "{} tools ready from {:?}",
        engine.registry().len(),
        engine.registry().providers()
    );

    let mut conversation = args.conversation;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log_error!(logger, "[cli] Failed to read stdin: {}", e);
                break;
            }
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let mut request = QueryRequest::new(text);
        request.conversation_id = conversation.clone();

        match engine.handle(request).await {
            Ok(response) => {
                if args.json {
                    match serde_json::to_string_pretty(&response) {
                        Ok(body) => println!("{}", body),
                        Err(e) => eprintln!("error: {}", e),
                    }
                } else {
                    for line in &response.responses {
                        println!("{}", line);
                    }
                    eprintln!("[conversation {}]", response.conversation_id);
                }
                conversation = Some(response.conversation_id);
            }
            Err(payload) => eprintln!("error: {}", payload.detail),
        }
    }

    let report = engine.shutdown().await;
    for failure in &report.failed {
        eprintln!("provider {} did not close cleanly: {}", failure.provider, failure.error);
    }
    ExitCode::SUCCESS
}
