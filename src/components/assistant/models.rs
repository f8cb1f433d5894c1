use crate::components::schedule::{NewEventPayload, SubmittedEvent};
use crate::error::{assistant_error, ScheduleResult};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use tracing::error;

/// What the assistant wants to do with the schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Add,
    Remove,
    Reschedule,
    Summarize,
    /// Place flexible tasks into free slots
    Autoschedule,
}

impl Intent {
    /// Intents whose changes are new events to store
    pub fn creates_events(&self) -> bool {
        matches!(self, Intent::Add | Intent::Autoschedule)
    }
}

/// One task the assistant proposes to add, move or remove
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedChange {
    /// Existing event id, for removals and reschedules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "description", skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl ProposedChange {
    pub fn into_payload(self) -> NewEventPayload {
        NewEventPayload {
            title: self.title,
            category: self.category,
            description: self.desc,
            priority: self.priority,
            due_date: self.due_date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// The JSON document the model is asked to answer with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub intent: Intent,
    #[serde(default)]
    pub changes: Vec<ProposedChange>,
    #[serde(default)]
    pub summary: String,
}

/// A proposed event the store refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedChange {
    pub title: String,
    pub error: String,
}

/// Result of one assistant request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutcome {
    pub intent: Intent,
    pub summary: String,
    /// Events that were stored
    pub applied: Vec<SubmittedEvent>,
    pub rejected: Vec<RejectedChange>,
    /// Changes returned for the user to carry out
    pub proposed: Vec<ProposedChange>,
}

/// Extract the reply document from the model's text.
///
/// Models often wrap JSON in a code fence or a sentence, so the outermost
/// `{...}` span is tried before the whole text.
pub fn parse_reply(text: &str) -> ScheduleResult<AssistantReply> {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            match from_str::<AssistantReply>(&text[start..=end]) {
                Ok(reply) => return Ok(reply),
                Err(e) => error!("Failed to parse assistant JSON: {}", e),
            }
        }
    }

    from_str::<AssistantReply>(text.trim()).map_err(|e| {
        error!("Could not extract a reply from: {}", text);
        assistant_error(&format!("Assistant reply is not valid JSON: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_fenced_reply() {
        let text = "Here you go:\n```json\n{\"intent\": \"add\", \"changes\": [{\"title\": \
                    \"Gym\", \"startTime\": \"2025-10-01T18:00\", \"endTime\": \
                    \"2025-10-01T19:00\"}], \"summary\": \"Added gym\"}\n```";

        let reply = parse_reply(text).unwrap();
        assert_eq!(reply.intent, Intent::Add);
        assert_eq!(reply.changes.len(), 1);
        assert_eq!(reply.changes[0].start_time.as_deref(), Some("2025-10-01T18:00"));
        assert_eq!(reply.summary, "Added gym");
    }

    #[test]
    fn test_parse_summary_without_changes() {
        let reply = parse_reply(r#"{"intent": "summarize", "summary": "Busy week"}"#).unwrap();
        assert_eq!(reply.intent, Intent::Summarize);
        assert!(reply.changes.is_empty());
        assert!(!reply.intent.creates_events());
    }

    #[test]
    fn test_parse_rejects_prose_and_unknown_intents() {
        let prose = parse_reply("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(prose, Error::Assistant(_)));

        let unknown = parse_reply(r#"{"intent": "delete everything"}"#).unwrap_err();
        assert!(matches!(unknown, Error::Assistant(_)));
    }

    #[test]
    fn test_change_description_alias() {
        let change: ProposedChange =
            serde_json::from_str(r#"{"title": "Read", "description": "Ch. 4"}"#).unwrap();
        let payload = change.into_payload();
        assert_eq!(payload.description.as_deref(), Some("Ch. 4"));
    }
}
