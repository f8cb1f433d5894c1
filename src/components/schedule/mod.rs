pub mod actor;
pub mod agenda;
pub mod grid;
pub mod handle;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod placement;
pub mod view;

pub use agenda::{render_agenda, AgendaRow};
pub use grid::{build_week, WeekGrid};
pub use handle::ScheduleHandle;
pub use models::{NewEventPayload, NormalizedEvent, RawEvent};
pub use normalizer::{normalize, normalize_all};
pub use orchestrator::{Navigation, RenderedSchedule, SubmittedEvent};
pub use placement::{render_week, PlacedEvent, WeekView};
pub use view::{Page, Transition, ViewEvent, ViewState};
