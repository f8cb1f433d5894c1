#[cfg(feature = "assistant")]
pub mod gemini;
pub mod models;

pub use models::{parse_reply, AssistantReply, ChatOutcome, Intent, ProposedChange, RejectedChange};

use crate::components::schedule::orchestrator::today_in;
use crate::components::schedule::{AgendaRow, ScheduleHandle};
use crate::error::{validation_error, Error, ScheduleResult};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

pub const PROMPT_REQUIRED_MESSAGE: &str = "Prompt is required.";

/// A chat model that answers scheduling requests
#[async_trait]
pub trait AssistantModel: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Send one fully built request and return the raw reply text
    async fn complete(&self, request: &str) -> ScheduleResult<String>;
}

/// The trimmed prompt, or the validation error for a blank one
pub fn require_prompt(prompt: &str) -> ScheduleResult<&str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        Err(validation_error(PROMPT_REQUIRED_MESSAGE))
    } else {
        Ok(prompt)
    }
}

/// Build the request text: the date context, the current tasks and the prompt
pub fn build_request(prompt: &str, agenda: &[AgendaRow], handle: &ScheduleHandle) -> String {
    let tz = handle.tz();
    let tasks: Vec<_> = agenda
        .iter()
        .filter_map(|row| match row {
            AgendaRow::Entry {
                id,
                title,
                event_type,
                formatted_date,
                ..
            } => Some(json!({
                "id": id,
                "title": title,
                "type": event_type,
                "when": formatted_date,
            })),
            AgendaRow::Placeholder { .. } => None,
        })
        .collect();

    format!(
        "Today is {} in time zone {}.\nCurrent tasks:\n{}\n\nRequest: {}",
        today_in(tz).format("%Y-%m-%d"),
        tz.name(),
        serde_json::Value::Array(tasks),
        prompt
    )
}

/// Answer a prompt and store the events an add or autoschedule reply creates.
///
/// Changes the store rejects are reported back instead of failing the whole
/// request. Removals and reschedules are returned as proposals.
pub async fn ask(
    model: &dyn AssistantModel,
    schedule: &ScheduleHandle,
    prompt: &str,
) -> ScheduleResult<ChatOutcome> {
    let prompt = require_prompt(prompt)?;
    let rendered = schedule.refresh().await?;
    let request = build_request(prompt, &rendered.agenda, schedule);

    info!("Asking {} about {} tasks", model.name(), rendered.agenda.len());
    let reply = parse_reply(&model.complete(&request).await?)?;
    debug!("Assistant intent {:?} with {} changes", reply.intent, reply.changes.len());

    let mut outcome = ChatOutcome {
        intent: reply.intent,
        summary: reply.summary,
        applied: Vec::new(),
        rejected: Vec::new(),
        proposed: Vec::new(),
    };

    if !reply.intent.creates_events() {
        outcome.proposed = reply.changes;
        return Ok(outcome);
    }

    for change in reply.changes {
        let title = change.title.clone();
        match schedule.submit_event(change.into_payload()).await {
            Ok(submitted) => outcome.applied.push(submitted),
            Err(Error::ValidationFailure(message)) => {
                warn!("Assistant proposed an invalid event {:?}: {}", title, message);
                outcome.rejected.push(RejectedChange {
                    title,
                    error: message,
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}
