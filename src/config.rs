use crate::error::{config_error, env_error, ScheduleResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;

/// Default time zone used for placement and due-date anchoring
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Component names that can be toggled in `config/components.toml`
pub const LOCAL_EVENTS: &str = "local_events";
pub const GOOGLE_CALENDAR: &str = "google_calendar";
pub const CANVAS: &str = "canvas";
pub const ASSISTANT: &str = "assistant";

/// Gemini model used by the assistant when `GEMINI_MODEL` is unset
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

const COMPONENTS_FILE: &str = "config/components.toml";

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA time zone name used to place events on the grid
    pub timezone: String,
    /// Address the web server binds to
    pub host: String,
    /// Port the web server listens on
    pub port: u16,
    /// Base URL of the collaborator that stores local events
    pub events_url: Option<String>,
    /// JSON file used to seed the in-memory event store
    pub seed_file: Option<String>,
    /// Google Calendar ID to read from
    pub google_calendar_id: Option<String>,
    /// Google Calendar access token
    pub google_access_token: Option<String>,
    /// How many days ahead of today to fetch calendar events
    pub calendar_lookahead_days: i64,
    /// Canvas instance URL, e.g. https://canvas.instructure.com
    pub canvas_base_url: Option<String>,
    /// Canvas API access token
    pub canvas_token: Option<String>,
    /// How many weeks ahead to fetch Canvas assignments
    pub canvas_window_weeks: i64,
    /// Gemini API key for the scheduling assistant
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    pub gemini_model: String,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
    /// Locale for user-facing labels
    pub locale: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            events_url: None,
            seed_file: None,
            google_calendar_id: None,
            google_access_token: None,
            calendar_lookahead_days: 28,
            canvas_base_url: None,
            canvas_token: None,
            canvas_window_weeks: 2,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            components: default_components(),
            locale: "en".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> ScheduleResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Self::default();

        let timezone = env::var("TIMEZONE").unwrap_or(defaults.timezone);
        let host = env::var("HOST").unwrap_or(defaults.host);

        // Parse numeric values
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| env_error("Invalid PORT format"))?,
            Err(_) => defaults.port,
        };

        let calendar_lookahead_days = match env::var("CALENDAR_LOOKAHEAD_DAYS") {
            Ok(value) => value
                .parse::<i64>()
                .map_err(|_| env_error("Invalid CALENDAR_LOOKAHEAD_DAYS format"))?,
            Err(_) => defaults.calendar_lookahead_days,
        };

        let canvas_window_weeks = match env::var("CANVAS_WINDOW_WEEKS") {
            Ok(value) => value
                .parse::<i64>()
                .map_err(|_| env_error("Invalid CANVAS_WINDOW_WEEKS format"))?,
            Err(_) => defaults.canvas_window_weeks,
        };

        let locale = env::var("HORAI_LOCALE").unwrap_or(defaults.locale);
        let gemini_model = optional_var("GEMINI_MODEL").unwrap_or(defaults.gemini_model);

        // Load components configuration from file if it exists
        let mut components = defaults.components;
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            if let Ok(file_components) = toml::from_str::<HashMap<String, bool>>(&content) {
                // Merge with defaults
                for (key, value) in file_components {
                    components.insert(key, value);
                }
            }
        }

        let config = Config {
            timezone,
            host,
            port,
            events_url: optional_var("HORAI_EVENTS_URL"),
            seed_file: optional_var("HORAI_SEED_FILE"),
            google_calendar_id: optional_var("GOOGLE_CALENDAR_ID"),
            google_access_token: optional_var("GOOGLE_ACCESS_TOKEN"),
            calendar_lookahead_days,
            canvas_base_url: optional_var("CANVAS_BASE_URL"),
            canvas_token: optional_var("CANVAS_TOKEN"),
            canvas_window_weeks,
            gemini_api_key: optional_var("GEMINI_API_KEY"),
            gemini_model,
            components,
            locale,
        };

        // Reject unknown zones at load time
        config.tz()?;

        Ok(config)
    }

    /// Parsed time zone
    pub fn tz(&self) -> ScheduleResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown time zone: {}", self.timezone)))
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}

fn default_components() -> HashMap<String, bool> {
    let mut components = HashMap::new();
    components.insert(LOCAL_EVENTS.to_string(), true);
    components.insert(GOOGLE_CALENDAR.to_string(), true);
    components.insert(CANVAS.to_string(), true);
    components.insert(ASSISTANT.to_string(), true);
    components
}

/// Read an environment variable, treating blank values as unset
fn optional_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
