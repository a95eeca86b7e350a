//! Interactive interview session and history rendering.

use crate::client::ProctorClient;
use crate::view::SessionView;
use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use proctor_engine::prompts::strip_score_marker;
use proctor_store::{Interview, Message, Speaker};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// How long to wait for the event stream to echo a turn before falling back
/// to the direct response text.
const EVENT_DRAIN_WINDOW: Duration = Duration::from_millis(300);

/// Run one full interview session: create, converse, render feedback.
pub async fn run_interview(client: &ProctorClient, role: String) -> Result<()> {
    let interview = client.create_interview(&role).await?;
    println!(
        "\n{} {}",
        style("Mock interview:").bold(),
        style(&interview.role).cyan()
    );
    println!("{}\n", style(format!("Session {}", interview.id)).dim());

    // The live stream is best-effort; the session works without it.
    let mut events = match client.subscribe_messages(&interview.id).await {
        Ok(rx) => Some(rx),
        Err(e) => {
            tracing::warn!(error = %e, "Event stream unavailable; using direct responses only");
            None
        }
    };
    let mut view = SessionView::new();

    let reply = client.start(&interview.id).await?;
    render_turn(&mut view, events.as_mut(), &reply.message).await;

    loop {
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("You")
            .validate_with(|input: &String| {
                if input.trim().is_empty() {
                    Err("answer must not be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;

        let reply = match client.respond(&interview.id, answer.trim()).await {
            Ok(reply) => reply,
            Err(e) => {
                eprintln!("{} {e}", style("Turn failed:").red());
                continue;
            }
        };

        render_turn(&mut view, events.as_mut(), &reply.message).await;

        if reply.completed == Some(true) {
            break;
        }
    }

    let interview = client.get_interview(&interview.id).await?;
    render_feedback(&interview);
    Ok(())
}

/// Display the AI side of one turn.
///
/// New messages from the event stream render through the de-duplicating view.
/// If the stream has not delivered this turn's message inside the drain
/// window, the direct response text is printed instead and recorded so the
/// late stream echo does not render again.
async fn render_turn(
    view: &mut SessionView,
    events: Option<&mut mpsc::UnboundedReceiver<Message>>,
    direct_text: &str,
) {
    let mut direct_seen = false;

    if let Some(rx) = events {
        while let Ok(Some(message)) = timeout(EVENT_DRAIN_WINDOW, rx.recv()).await {
            let is_direct = message.role == Speaker::Ai && message.content == direct_text;
            if let Some(new) = view.observe(message) {
                if new.role == Speaker::Ai {
                    print_interviewer(&new.content);
                }
            }
            if is_direct {
                direct_seen = true;
                break;
            }
        }
    }

    if !direct_seen {
        view.observe_unkeyed(direct_text);
        print_interviewer(direct_text);
    }
}

fn print_interviewer(text: &str) {
    println!("\n{}", style("Interviewer").bold().cyan());
    println!("{text}\n");
}

/// Render the completed interview's score and feedback.
pub fn render_feedback(interview: &Interview) {
    println!("\n{}", style("Interview complete").bold().green());

    if let Some(score) = interview.score {
        let styled = if score >= 80 {
            style(format!("{score}/100")).green().bold()
        } else if score >= 60 {
            style(format!("{score}/100")).yellow().bold()
        } else {
            style(format!("{score}/100")).red().bold()
        };
        println!("{} {styled}", style("Score:").bold());
    }

    if let Some(feedback) = &interview.feedback {
        println!("\n{}", strip_score_marker(feedback));
    }
}

/// Print completed interviews, newest first.
pub async fn run_history(client: &ProctorClient, limit: u32) -> Result<()> {
    let interviews = client.history(limit).await?;

    if interviews.is_empty() {
        println!("No completed interviews yet.");
        return Ok(());
    }

    for interview in &interviews {
        let when = interview
            .completed_at
            .unwrap_or(interview.created_at)
            .format("%Y-%m-%d %H:%M");
        let score = interview
            .score
            .map_or_else(|| "-".to_string(), |s| format!("{s}/100"));
        println!(
            "{}  {:<24}  {:>7}  {}",
            style(when).dim(),
            interview.role,
            style(score).bold(),
            style(&interview.id).dim()
        );
    }

    Ok(())
}
