use super::EventSource;
use crate::components::schedule::models::{EventDetails, LocalTask, NewEventPayload, RawEvent};
use crate::error::{component_error, fetch_error, ScheduleResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::LINK;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace, warn};
use url::Url;

const PER_PAGE: &str = "100";

#[derive(Debug, Deserialize)]
struct Course {
    id: u64,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Assignment {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    due_at: Option<String>,
}

/// Upcoming assignments from a Canvas LMS instance, read as due-date tasks
pub struct CanvasSource {
    client: Client,
    base_url: String,
    token: String,
    window_weeks: i64,
}

impl CanvasSource {
    pub fn new(base_url: &str, token: &str, window_weeks: i64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            window_weeks,
        }
    }

    fn api_url(&self, path: &str, query: &[(&str, &str)]) -> ScheduleResult<Url> {
        let mut url = Url::parse(&format!("{}/api/v1/{}", self.base_url, path))
            .map_err(|e| fetch_error(&format!("Failed to parse URL: {}", e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("per_page", PER_PAGE);
        }
        Ok(url)
    }

    /// Fetch every page of a list endpoint, following `Link: rel="next"`
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ScheduleResult<Vec<T>> {
        let mut next = Some(self.api_url(path, query)?);
        let mut items = Vec::new();

        while let Some(url) = next.take() {
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await
                .map_err(|e| fetch_error(&format!("Canvas request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(fetch_error(&format!(
                    "Canvas returned HTTP {} for {}",
                    response.status(),
                    path
                )));
            }

            next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_link)
                .and_then(|link| Url::parse(&link).ok());

            let page: Vec<T> = response
                .json()
                .await
                .map_err(|e| fetch_error(&format!("Failed to parse Canvas response: {}", e)))?;
            trace!("Canvas {}: {} items on this page", path, page.len());
            items.extend(page);
        }

        Ok(items)
    }

    async fn fetch_courses(&self) -> ScheduleResult<Vec<Course>> {
        self.get_all("courses", &[("enrollment_state", "active"), ("include[]", "term")])
            .await
    }

    async fn fetch_assignments(&self, course: &Course) -> ScheduleResult<Vec<Assignment>> {
        let path = format!("courses/{}/assignments", course.id);
        self.get_all(&path, &[("bucket", "upcoming")]).await
    }
}

/// The `rel="next"` target of an RFC 8288 `Link` header
fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if is_next {
            target
                .strip_prefix('<')
                .and_then(|target| target.strip_suffix('>'))
                .map(ToOwned::to_owned)
        } else {
            None
        }
    })
}

/// Whether an assignment is due inside `[now, now + window]`
fn due_within(due_at: &str, now: DateTime<Utc>, window: Duration) -> bool {
    match DateTime::parse_from_rfc3339(due_at) {
        Ok(due) => {
            let due = due.with_timezone(&Utc);
            now <= due && due <= now + window
        }
        Err(_) => false,
    }
}

fn assignment_task(assignment: Assignment) -> RawEvent {
    RawEvent::LocalTask(LocalTask {
        details: EventDetails {
            id: Some(format!("canvas-{}", assignment.id)),
            title: assignment.name,
            category: Some("Assignment".to_string()),
            priority: Some("med".to_string()),
            description: assignment.description,
            source: Some("canvas".to_string()),
        },
        due_date: assignment.due_at,
    })
}

#[async_trait]
impl EventSource for CanvasSource {
    fn name(&self) -> &'static str {
        "canvas"
    }

    async fn fetch_events(&self) -> ScheduleResult<Vec<RawEvent>> {
        let courses = self.fetch_courses().await?;
        let now = Utc::now();
        let window = Duration::weeks(self.window_weeks);

        let mut tasks = Vec::new();
        for course in &courses {
            // A failing course is skipped
            let assignments = match self.fetch_assignments(course).await {
                Ok(assignments) => assignments,
                Err(e) => {
                    warn!("Skipping course {:?}: {}", course.name, e);
                    continue;
                }
            };

            let before = tasks.len();
            tasks.extend(
                assignments
                    .into_iter()
                    .filter(|assignment| {
                        assignment
                            .due_at
                            .as_deref()
                            .is_some_and(|due_at| due_within(due_at, now, window))
                    })
                    .map(assignment_task),
            );
            debug!(
                "Course {:?}: {} upcoming assignments",
                course.name,
                tasks.len() - before
            );
        }

        Ok(tasks)
    }

    async fn submit_event(&self, _payload: &NewEventPayload) -> ScheduleResult<RawEvent> {
        Err(component_error("Canvas is read-only"))
    }
}
