use super::AssistantModel;
use crate::error::{assistant_error, ScheduleResult};
use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::gemini::Client as GeminiClient;
use tracing::info;

const SYSTEM_PROMPT: &str = "You are a task scheduling assistant. Read the user's current \
tasks and their request, then decide on exactly one intent: add, remove, reschedule, \
summarize or autoschedule.

Answer with a single JSON object and nothing else:
{
  \"intent\": \"add|remove|reschedule|summarize|autoschedule\",
  \"changes\": [
    {
      \"id\": \"existing task id, only for remove and reschedule\",
      \"title\": \"string\",
      \"desc\": \"short description\",
      \"startTime\": \"YYYY-MM-DDTHH:MM\",
      \"endTime\": \"YYYY-MM-DDTHH:MM\",
      \"dueDate\": \"YYYY-MM-DDTHH:MM\"
    }
  ],
  \"summary\": \"plain English summary of the changes\"
}

Each change has either a dueDate or both startTime and endTime, with startTime before endTime.
Times are 24-hour local times in the user's time zone. When no date is given, use the current \
week.
Exams, classes, deadlines and calendar events are fixed and must never be moved or removed.
Autoschedule only places flexible tasks (study, projects, reviews, chores) into free slots \
between 08:00 and 22:00 without double-booking, spreading them across the week when a day \
is full.";

/// Assistant backed by Google Gemini through Rig
pub struct GeminiAssistant {
    client: GeminiClient,
    model: String,
}

impl GeminiAssistant {
    pub fn new(api_key: &str, model: &str) -> Self {
        info!("Using Gemini model: {}", model);
        Self {
            client: GeminiClient::new(api_key),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl AssistantModel for GeminiAssistant {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, request: &str) -> ScheduleResult<String> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(SYSTEM_PROMPT)
            .temperature(0.2)
            .build();

        let response = agent
            .chat(request.to_string(), Vec::<Message>::new())
            .await
            .map_err(|e| assistant_error(&format!("Gemini request failed: {}", e)))?;

        info!("Received response from Gemini");
        Ok(response)
    }
}
