use serde::{Deserialize, Serialize};

/// Pages reachable once signed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Page {
    #[default]
    Calendar,
    List,
    AddEvent,
    Connections,
}

impl Page {
    /// Whether showing this page needs a fresh render
    pub fn shows_schedule(&self) -> bool {
        matches!(self, Page::Calendar | Page::List)
    }
}

/// What the user is currently looking at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewState {
    #[default]
    Login,
    Register,
    Main { page: Page },
}

/// User-driven events that move between views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ViewEvent {
    ShowRegister,
    ShowLogin,
    /// Sign-in or registration succeeded
    SignedIn {
        #[serde(default)]
        page: Option<Page>,
    },
    Open { page: Page },
    /// A new event was saved; the list page is shown next
    EventCreated,
    SignedOut,
}

/// Outcome of applying a view event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub state: ViewState,
    /// The schedule must be re-rendered
    pub reload: bool,
    /// The cached render belongs to a finished session and must be dropped
    #[serde(default)]
    pub teardown: bool,
}

impl ViewState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, ViewState::Main { .. })
    }

    /// Apply `event` to the current state.
    ///
    /// Page changes are ignored while signed out, and auth screens are
    /// ignored while signed in.
    pub fn apply(self, event: ViewEvent) -> Transition {
        let stay = Transition {
            state: self,
            reload: false,
            teardown: false,
        };

        match (self, event) {
            (ViewState::Login, ViewEvent::ShowRegister) => Transition {
                state: ViewState::Register,
                ..stay
            },
            (ViewState::Register, ViewEvent::ShowLogin) => Transition {
                state: ViewState::Login,
                ..stay
            },
            (ViewState::Login | ViewState::Register, ViewEvent::SignedIn { page }) => {
                let page = page.unwrap_or_default();
                Transition {
                    state: ViewState::Main { page },
                    reload: true,
                    teardown: false,
                }
            }
            (ViewState::Main { .. }, ViewEvent::Open { page }) => Transition {
                state: ViewState::Main { page },
                reload: page.shows_schedule(),
                teardown: false,
            },
            (ViewState::Main { .. }, ViewEvent::EventCreated) => Transition {
                state: ViewState::Main { page: Page::List },
                reload: true,
                teardown: false,
            },
            (ViewState::Main { .. }, ViewEvent::SignedOut) => Transition {
                state: ViewState::Login,
                reload: false,
                teardown: true,
            },
            _ => stay,
        }
    }
}
