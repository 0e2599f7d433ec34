//! # Terminal chat
//!
//! A line-based chat client on top of [`ChatClient`]. The reply is printed
//! while it streams in; rejections are shown as notifications and the
//! conversation continues.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-…             # mandatory
//! export OPENAI_BASE_URL=http://…/v1     # optional, any compatible endpoint
//! RUST_LOG=chatwire=debug cargo run -p chatwire --example openai_terminal_chat
//! ```
//!
//! Commands: `/models` lists the available models, `/model <id>` switches,
//! `/quit` exits.

use std::{
    io::{self, Write},
    sync::Mutex,
};

use anyhow::Context;
use chatwire::{
    ChatClient,
    openai::OpenAiAdapterBuilder,
    session::SendOutcome,
    transcript::{Role, Transcript},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Prints whatever part of the trailing assistant message is new.
fn printer() -> impl Fn(&Transcript) + Send + Sync {
    let printed = Mutex::new(0usize);
    move |transcript: &Transcript| {
        let last = transcript.last();
        let mut printed = printed.lock().unwrap_or_else(|e| e.into_inner());
        if last.role != Role::Assistant {
            *printed = 0;
            return;
        }
        if let Some(fresh) = last.content.get(*printed..) {
            print!("{fresh}");
            io::stdout().flush().ok();
        }
        *printed = last.content.len();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
    let backend = OpenAiAdapterBuilder::new_from_env().build()?;
    let mut client = ChatClient::new(backend).with_observer(printer());

    match client.submit_credential(key).await {
        Ok(Some(model)) => println!("Using {model}. Type /quit to leave."),
        Ok(None) => anyhow::bail!("the key is valid but no chat model is available"),
        Err(err) => anyhow::bail!(err.user_message()),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line.split_once(' ').unwrap_or((line, "")) {
            ("", _) => continue,
            ("/quit", _) => break,
            ("/models", _) => {
                for id in client.resolver().models() {
                    let marker = if Some(id.as_str()) == client.resolver().selected_model() { '*' } else { ' ' };
                    println!("{marker} {id}");
                }
                continue;
            }
            ("/model", id) => {
                if let Err(err) = client.select_model(id.trim()) {
                    eprintln!("{err}");
                }
                continue;
            }
            _ => {}
        }

        match client.send(line).await {
            Ok(SendOutcome::Completed { .. }) => println!(),
            Ok(SendOutcome::Interrupted { error, .. }) => {
                eprintln!("\n[connection lost: {}]", error.user_message());
            }
            Ok(SendOutcome::Ignored) => eprintln!("[still busy]"),
            Err(err) => eprintln!("[{}]", err.user_message()),
        }
    }

    Ok(())
}
