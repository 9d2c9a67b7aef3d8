//! Dashboard view state machine (loading / error / ready) and fetch-cycle tagging.
//!
//! The view is always in exactly one phase. Each fetch cycle gets a
//! generation number; results from an older generation are discarded.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::FetchErrorKind;

/// Which of the three screens the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", content = "kind", rename_all = "snake_case")]
pub enum ViewPhase {
    #[default]
    Loading,
    /// `None` is the untyped "unexpected error".
    Error(Option<FetchErrorKind>),
    Ready,
}

impl ViewPhase {
    pub fn is_loading(self) -> bool {
        matches!(self, ViewPhase::Loading)
    }

    pub fn is_error(self) -> bool {
        matches!(self, ViewPhase::Error(_))
    }

    /// Theme selection only runs against ready data.
    pub fn shows_theme(self) -> bool {
        matches!(self, ViewPhase::Ready)
    }

    /// Retry and go-home are offered on the error screen.
    pub fn offers_recovery(self) -> bool {
        self.is_error()
    }

    /// State after a fetch cycle starts. Any phase may be superseded.
    pub fn on_fetch_started(self) -> Self {
        ViewPhase::Loading
    }

    /// State after the primary fetch succeeded.
    pub fn on_fetch_succeeded(self) -> Self {
        ViewPhase::Ready
    }

    /// State after the primary fetch failed.
    pub fn on_fetch_failed(self, kind: Option<FetchErrorKind>) -> Self {
        ViewPhase::Error(kind)
    }
}

/// Monotonic fetch-cycle counter shared between the controller and its tasks.
#[derive(Debug, Default)]
pub struct CycleCounter {
    current: AtomicU64,
}

impl CycleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle, superseding every earlier one.
    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Generation of the most recently started cycle (0 before the first).
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_phase_is_loading() {
        assert!(ViewPhase::default().is_loading());
    }

    #[test]
    fn success_transitions_to_ready() {
        let s = ViewPhase::Loading.on_fetch_succeeded();
        assert_eq!(s, ViewPhase::Ready);
        assert!(s.shows_theme());
        assert!(!s.offers_recovery());
    }

    #[test]
    fn failure_transitions_to_error() {
        let s = ViewPhase::Loading.on_fetch_failed(Some(FetchErrorKind::CityNotFound));
        assert_eq!(s, ViewPhase::Error(Some(FetchErrorKind::CityNotFound)));
        assert!(!s.shows_theme());
        assert!(s.offers_recovery());
    }

    #[test]
    fn new_cycle_supersedes_any_phase() {
        assert!(ViewPhase::Ready.on_fetch_started().is_loading());
        assert!(ViewPhase::Error(None).on_fetch_started().is_loading());
    }

    #[test]
    fn loading_never_shows_theme() {
        assert!(!ViewPhase::Loading.shows_theme());
        assert!(!ViewPhase::Error(None).shows_theme());
    }

    #[test]
    fn counter_marks_older_cycles_stale() {
        let counter = CycleCounter::new();
        assert_eq!(counter.current(), 0);

        let first = counter.begin();
        assert!(counter.is_current(first));

        let second = counter.begin();
        assert!(second > first);
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }
}
