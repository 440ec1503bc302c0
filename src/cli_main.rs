//! Command-line front door: a read-eval-print loop over one session.
//! `exit` or `quit` (any case) ends the conversation.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use uuid::Uuid;

use tradechat_backend::agent::{run_turn, GENERIC_FAILURE};
use tradechat_backend::config::Settings;
use tradechat_backend::core::logging;
use tradechat_backend::memory::Role;
use tradechat_backend::state::AppState;
use tradechat_backend::tools::ToolContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("Failed to load configuration")?;
    logging::init(&settings.log_dir);

    let state = AppState::initialize(settings).await?;
    let session_id = Uuid::new_v4().to_string();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("User: ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        let ctx = ToolContext {
            es: state.es.clone(),
            index: state.settings.elastic.index.clone(),
            sessions: state.sessions.clone(),
            session_id: session_id.clone(),
        };

        let response = match run_turn(state.llm.as_ref(), &state.tools, &ctx, input).await {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!("agent turn failed: {}", err);
                GENERIC_FAILURE.to_string()
            }
        };

        state.sessions.append(&session_id, Role::User, input);
        state.sessions.append(&session_id, Role::Assistant, &response);

        println!("Assistant: {}", response);
    }

    Ok(())
}
