//! Loader state, the retry control it exposes, and the live feed view.

use std::fmt;

use reqwest::Url;

pub const LABEL_LOAD_MORE: &str = "Load more";
pub const LABEL_LOADING: &str = "Loading…";
pub const LABEL_TRY_AGAIN: &str = "Try again";

/// Where the loader is in its load loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    /// A fetch failed; only a manual retry resumes loading.
    Error,
    /// No further page exists. Terminal.
    Complete,
}

impl LoaderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderState::Idle => "idle",
            LoaderState::Loading => "loading",
            LoaderState::Error => "error",
            LoaderState::Complete => "complete",
        }
    }
}

impl fmt::Display for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The manual "load more" affordance attached to the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryControl {
    pub visible: bool,
    pub enabled: bool,
    pub label: &'static str,
}

impl RetryControl {
    fn hidden() -> Self {
        Self { visible: false, enabled: false, label: LABEL_LOAD_MORE }
    }
}

/// Live feed as the loader has assembled it so far.
#[derive(Debug)]
pub(crate) struct LiveView {
    pub state: LoaderState,
    pub cards: Vec<String>,
    /// Continuation the sentinel currently points at.
    pub next: Option<Url>,
    /// No intersection capability: retry is the only trigger.
    pub manual: bool,
    /// Set by a manual retry out of the error state until the next apply.
    pub recovering: bool,
}

impl LiveView {
    pub fn new(cards: Vec<String>, next: Option<Url>, manual: bool) -> Self {
        let state = if next.is_some() { LoaderState::Idle } else { LoaderState::Complete };
        Self { state, cards, next, manual, recovering: false }
    }

    pub fn complete(&mut self) {
        self.state = LoaderState::Complete;
        self.next = None;
        self.recovering = false;
    }

    pub fn retry_control(&self) -> RetryControl {
        match self.state {
            LoaderState::Complete => RetryControl::hidden(),
            LoaderState::Error => RetryControl { visible: true, enabled: true, label: LABEL_TRY_AGAIN },
            LoaderState::Loading if self.manual || self.recovering => {
                RetryControl { visible: true, enabled: false, label: LABEL_LOADING }
            }
            LoaderState::Idle if self.manual => RetryControl { visible: true, enabled: true, label: LABEL_LOAD_MORE },
            LoaderState::Loading | LoaderState::Idle => RetryControl::hidden(),
        }
    }
}
