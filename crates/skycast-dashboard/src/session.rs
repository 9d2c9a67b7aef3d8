//! The user's selected city, shared between the CLI and the controller.

use tokio::sync::watch;

/// Holds the selected city. `None` means "no explicit choice": the
/// controller falls back to geolocation or the default city.
#[derive(Debug)]
pub struct Session {
    selected: watch::Sender<Option<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (selected, _) = watch::channel(None);
        Self { selected }
    }

    pub fn selected(&self) -> Option<String> {
        self.selected.borrow().clone()
    }

    /// Change the selection. Returns true when the value changed.
    ///
    /// Names are trimmed; an empty name clears the selection.
    pub fn set_city(&self, city: Option<String>) -> bool {
        let city = city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let changed = self.selected.send_if_modified(|current| {
            if *current == city {
                false
            } else {
                *current = city.clone();
                true
            }
        });
        if changed {
            tracing::debug!(city = ?city, "Selected city changed");
        }
        changed
    }

    /// Watch selection changes
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.selected.subscribe()
    }
}
