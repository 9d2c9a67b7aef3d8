//! Debounced city suggestions.
//!
//! Each keystroke (`input`) restarts the quiet period; only the last input
//! in a burst reaches the lookup service. Results arrive on an mpsc channel.

use skycast_core::LookupError;
use skycast_weather::{CityLookupClient, Suggestion};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Suggestions (or the lookup failure) for one input value
#[derive(Debug)]
pub struct SuggestionUpdate {
    pub input: String,
    pub result: Result<Vec<Suggestion>, LookupError>,
}

pub struct Autocomplete {
    client: Arc<CityLookupClient>,
    debounce: Duration,
    tx: mpsc::Sender<SuggestionUpdate>,
    pending: Option<JoinHandle<()>>,
}

impl Autocomplete {
    pub fn new(
        client: Arc<CityLookupClient>,
        debounce: Duration,
    ) -> (Self, mpsc::Receiver<SuggestionUpdate>) {
        let (tx, rx) = mpsc::channel(16);
        (
            Self {
                client,
                debounce,
                tx,
                pending: None,
            },
            rx,
        )
    }

    /// Record new input text, cancelling any lookup not yet sent.
    ///
    /// Blank input clears the suggestions immediately without a request.
    pub fn input(&mut self, text: &str) {
        self.cancel();

        let input = text.trim().to_string();
        let tx = self.tx.clone();

        if input.is_empty() {
            let _ = tx.try_send(SuggestionUpdate {
                input,
                result: Ok(Vec::new()),
            });
            return;
        }

        let client = self.client.clone();
        let debounce = self.debounce;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let result = client.search(&input).await;
            if let Err(e) = &result {
                tracing::debug!(input = %input, error = %e, "City lookup failed");
            }
            let _ = tx.send(SuggestionUpdate { input, result }).await;
        }));
    }

    /// Drop the pending lookup, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Autocomplete {
    fn drop(&mut self) {
        self.cancel();
    }
}
