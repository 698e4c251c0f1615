//! Preference resolution state machine.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::elicitation::Elicitor;
use crate::negotiation::{
    Candidates, InteractiveNegotiation, Negotiated, NegotiationStrategy, SilentNegotiation,
};
use crate::preferences::{persist_dark_mode, persist_font_size};
use crate::store::ConfigStore;
use crate::types::{DarkMode, LatexResult, Preferences};

/// Whether the automatic first-call negotiation has already run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latch {
    Pending,
    Consumed,
}

#[derive(Debug)]
struct NegotiationState {
    preferences: Preferences,
    latch: Latch,
}

/// Owns the process-wide preferences and decides how unresolved values are
/// negotiated. All reads and writes go through one critical section.
pub struct PreferenceResolver {
    state: Mutex<NegotiationState>,
    store: Arc<dyn ConfigStore>,
}

impl PreferenceResolver {
    pub fn new(initial: Preferences, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            state: Mutex::new(NegotiationState {
                preferences: initial,
                latch: Latch::Pending,
            }),
            store,
        }
    }

    /// Current preferences, without side effects.
    pub async fn snapshot(&self) -> Preferences {
        self.state.lock().await.preferences
    }

    pub async fn latch(&self) -> Latch {
        self.state.lock().await.latch
    }

    /// Run the first-call negotiation once per process. Later calls return
    /// the current preferences untouched. Never fails: persistence errors are
    /// logged and the render goes on.
    pub async fn ensure_negotiated(&self, client: &dyn Elicitor) -> Preferences {
        let mut state = self.state.lock().await;
        if state.latch == Latch::Consumed {
            return state.preferences;
        }
        state.latch = Latch::Consumed;

        let candidates = Candidates::from(state.preferences);
        match self.resolve(&mut state, candidates, client).await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Could not persist LaTeX preferences: {e}");
                state.preferences
            }
        }
    }

    /// Explicitly set preferences. An omitted dark mode keeps the current
    /// one. An omitted or unknown font size clears the stored font size
    /// unless the client is asked and answers.
    pub async fn set_preferences(
        &self,
        client: &dyn Elicitor,
        dark_mode: Option<bool>,
        font_size: Option<String>,
    ) -> LatexResult<Preferences> {
        let mut state = self.state.lock().await;

        let current = state.preferences;
        let dark_mode = match dark_mode {
            Some(value) => DarkMode::from_option(Some(value)),
            None => current.dark_mode,
        };

        self.resolve(&mut state, Candidates::new(dark_mode, font_size), client)
            .await
    }

    async fn resolve(
        &self,
        state: &mut NegotiationState,
        candidates: Candidates,
        client: &dyn Elicitor,
    ) -> LatexResult<Preferences> {
        let interactive = candidates.needs_negotiation() && client.supports_elicitation().await;

        let outcome = if interactive {
            InteractiveNegotiation::new(client).negotiate(&candidates).await
        } else {
            SilentNegotiation.negotiate(&candidates).await
        };

        let prefs = match outcome {
            Negotiated::Declined => return Ok(state.preferences),
            Negotiated::Accepted(prefs) => {
                tracing::info!(
                    "Preferences accepted: dark_mode={:?} font_size={:?}",
                    prefs.dark_mode,
                    prefs.font_size
                );
                prefs
            }
            Negotiated::Kept(prefs) => prefs,
        };

        // Memory first: a failed write still leaves the new values in effect.
        state.preferences = prefs;
        if let Some(value) = prefs.dark_mode.as_option() {
            persist_dark_mode(self.store.as_ref(), value)?;
        }
        persist_font_size(self.store.as_ref(), prefs.font_size)?;
        Ok(prefs)
    }
}
