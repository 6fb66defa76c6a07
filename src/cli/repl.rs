use anyhow::Result;
use std::io::{self, Write};

use super::output::{self, NO_SESSION_HINT, THINKING};
use crate::chat::{Chat, SubmitOutcome};

pub async fn run(mut chat: Chat) -> Result<()> {
    println!("\x1b[1m{}\x1b[0m v{}", output::APP_TITLE, env!("CARGO_PKG_VERSION"));
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    match chat.state().current_session_id() {
        Some(token) => {
            println!("\x1b[90m{}\x1b[0m", output::session_caption(token));
            print_transcript(&chat);
        }
        None => print_sessions(&chat).await,
    }

    loop {
        eprint!("\x1b[32;1mholiya>\x1b[0m ");
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }

        let line = input.trim_end_matches(['\n', '\r']);
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        if command.starts_with('/') {
            if handle_command(command, &mut chat).await {
                continue;
            }
            break;
        }

        eprint!("\x1b[90m{THINKING}\x1b[0m");
        io::stderr().flush().ok();
        let outcome = chat.submit(line).await;
        eprint!("\r\x1b[2K");

        match outcome {
            SubmitOutcome::Sent(msg) => println!("\x1b[36;1m{}\x1b[0m {}\n", output::AI_LABEL, msg.ai_text),
            SubmitOutcome::NoSession => println!("{NO_SESSION_HINT} Use /new or /open <id>."),
            SubmitOutcome::Ignored => {}
        }
    }

    Ok(())
}

/// Returns `false` when the REPL should exit.
async fn handle_command(input: &str, chat: &mut Chat) -> bool {
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or(input);
    match cmd {
        "/help" | "/h" => {
            println!("\x1b[1mCommands:\x1b[0m");
            println!("  /new          Start a new session");
            println!("  /sessions     List sessions");
            println!("  /open <id>    Open a session by its number");
            println!("  /show         Print the current transcript");
            println!("  /exit         Exit");
        }
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            return false;
        }
        "/new" | "/n" => {
            let token = chat.new_session();
            println!("{}", output::session_caption(&token));
        }
        "/sessions" | "/s" => print_sessions(chat).await,
        "/open" | "/o" => match parts.next().map(str::parse::<i64>) {
            Some(Ok(db_id)) => match chat.open_session_by_id(db_id).await {
                Some(summary) => {
                    println!("\x1b[90m{}\x1b[0m", output::session_caption(&summary.session_token));
                    print_transcript(chat);
                }
                None => eprintln!("\x1b[31mNo session {db_id}.\x1b[0m Use /sessions to list them."),
            },
            _ => eprintln!("Usage: /open <id>"),
        },
        "/show" => print_transcript(chat),
        _ => eprintln!("Unknown command: {input}. Type /help for available commands."),
    }
    true
}

async fn print_sessions(chat: &Chat) {
    let sessions = chat.sessions().await;
    println!("\x1b[1m{}\x1b[0m", output::SESSIONS_HEADING);
    if sessions.is_empty() {
        println!("  No sessions.");
    } else {
        for line in output::format_session_list(&sessions, chat.state().current_chat_db_id()) {
            println!("{line}");
        }
    }
    println!();
}

fn print_transcript(chat: &Chat) {
    if chat.state().current_session_id().is_none() {
        println!("{NO_SESSION_HINT}");
        return;
    }
    for msg in chat.state().messages() {
        println!("{}\n", output::format_exchange(msg));
    }
}
