//! Chat and one-shot question commands

use crate::app::{AskArgs, ChatArgs, OutputFormat};
use crate::output::{self, StdoutSink};
use anyhow::Result;
use rfpscout_core::{BufferSink, Config, RfpAgent};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Read questions from stdin until an empty line or EOF
pub async fn run(args: ChatArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let agent = RfpAgent::from_config(config)?;

    eprintln!(
        "RFP Scout ({}), thread '{}'. Empty line or Ctrl-D to quit.",
        agent.model_name(),
        args.thread
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        std::io::stderr().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            break;
        }

        match format {
            OutputFormat::Cli => {
                let mut sink = StdoutSink::new();
                let reply = agent.respond(query, Some(&args.thread), &mut sink).await;
                print!("{}", output::format_sources(&reply.sources));
            }
            OutputFormat::Json => {
                let mut sink = BufferSink::new();
                let reply = agent.respond(query, Some(&args.thread), &mut sink).await;
                print!("{}", output::format_reply(&reply, format));
            }
        }
    }

    agent.close().await;
    Ok(())
}

pub async fn run_ask(args: AskArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let agent = RfpAgent::from_config(config)?;
    let query = args.query.join(" ");

    let reply = agent.ask(&query).await;
    if !reply.success && format == OutputFormat::Cli {
        anyhow::bail!(reply.error.unwrap_or(reply.response));
    }

    print!("{}", output::format_reply(&reply, format));
    if !reply.success {
        anyhow::bail!(reply.error.unwrap_or(reply.response));
    }
    Ok(())
}
