use crate::components::sources::{
    CanvasSource, EventSource, GoogleCalendarSource, LocalEventStore, MergedEventSource,
    RemoteEventSource,
};
use crate::components::AssistantModel;
use crate::config::{Config, ASSISTANT, CANVAS, GOOGLE_CALENDAR, LOCAL_EVENTS};
use crate::error::{config_error, Error, ScheduleResult};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub async fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Assemble the enabled event sources into one.
///
/// The local source comes first so that submissions reach it: the remote
/// collaborator when `HORAI_EVENTS_URL` is set, otherwise the in-memory store.
pub async fn build_event_source(config: &Config) -> ScheduleResult<Arc<dyn EventSource>> {
    let tz = config.tz()?;
    let mut sources: Vec<Arc<dyn EventSource>> = Vec::new();

    if config.is_component_enabled(LOCAL_EVENTS) {
        let local: Arc<dyn EventSource> = match (&config.events_url, &config.seed_file) {
            (Some(url), _) => {
                info!("Using event collaborator at {}", url);
                Arc::new(RemoteEventSource::new(url))
            }
            (None, Some(seed_file)) => {
                Arc::new(LocalEventStore::from_seed_file(seed_file, tz).await?)
            }
            (None, None) => {
                info!("Using in-memory event store");
                Arc::new(LocalEventStore::new(tz))
            }
        };
        sources.push(local);
    }

    if config.is_component_enabled(GOOGLE_CALENDAR) {
        match (&config.google_calendar_id, &config.google_access_token) {
            (Some(calendar_id), Some(token)) => {
                info!("Registering component: {}", GOOGLE_CALENDAR);
                sources.push(Arc::new(GoogleCalendarSource::new(
                    calendar_id,
                    token,
                    config.calendar_lookahead_days,
                    tz,
                )));
            }
            _ => info!("Google Calendar credentials not set, skipping"),
        }
    }

    if config.is_component_enabled(CANVAS) {
        match (&config.canvas_base_url, &config.canvas_token) {
            (Some(base_url), Some(token)) => {
                info!("Registering component: {}", CANVAS);
                sources.push(Arc::new(CanvasSource::new(
                    base_url,
                    token,
                    config.canvas_window_weeks,
                )));
            }
            _ => info!("Canvas credentials not set, skipping"),
        }
    }

    if sources.is_empty() {
        return Err(config_error("No event sources are enabled"));
    }

    Ok(Arc::new(MergedEventSource::new(sources)))
}

/// The scheduling assistant, when enabled and a Gemini key is configured
pub fn build_assistant(config: &Config) -> Option<Arc<dyn AssistantModel>> {
    if !config.is_component_enabled(ASSISTANT) {
        return None;
    }

    let Some(api_key) = &config.gemini_api_key else {
        info!("GEMINI_API_KEY not set, assistant disabled");
        return None;
    };

    gemini_assistant(api_key, &config.gemini_model)
}

#[cfg(feature = "assistant")]
fn gemini_assistant(api_key: &str, model: &str) -> Option<Arc<dyn AssistantModel>> {
    use crate::components::assistant::gemini::GeminiAssistant;

    info!("Registering component: {}", ASSISTANT);
    Some(Arc::new(GeminiAssistant::new(api_key, model)))
}

#[cfg(not(feature = "assistant"))]
fn gemini_assistant(_api_key: &str, _model: &str) -> Option<Arc<dyn AssistantModel>> {
    info!("Built without the assistant feature");
    None
}

/// Start the schedule actor and serve the HTTP API until a shutdown signal
#[cfg(feature = "web-interface")]
pub async fn start_server(config: Config) -> miette::Result<()> {
    use crate::components::schedule::orchestrator::today_in;
    use crate::components::ScheduleHandle;
    use crate::shutdown;
    use crate::web::{router, AppState};
    use tokio::sync::oneshot;

    // Set locale from config
    rust_i18n::set_locale(&config.locale);
    info!("Setting locale to {}", config.locale);

    let tz = config.tz()?;
    let source = build_event_source(&config).await?;
    let schedule = ScheduleHandle::new(source, today_in(tz), tz);

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    let shutdown_schedule = schedule.clone();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_schedule).await;
    });

    let assistant = build_assistant(&config);
    let app = router(AppState {
        schedule,
        assistant,
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(Error::from)?;
    info!("Listening on {} ({})", addr, tz);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_recv.await;
            info!("Received shutdown signal, stopping server...");
        })
        .await
        .map_err(Error::from)?;

    Ok(())
}
