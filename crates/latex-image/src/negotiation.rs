//! Preference negotiation strategies.
//!
//! Two interchangeable strategies decide what a resolution attempt produces:
//! [`InteractiveNegotiation`] asks the client through elicitation, and
//! [`SilentNegotiation`] keeps whatever candidates were supplied.

use async_trait::async_trait;
use serde_json::Value;

use crate::elicitation::{preferences_request, ElicitationAction, Elicitor};
use crate::preferences::{DARK_MODE_KEY, FONT_SIZE_KEY};
use crate::types::{DarkMode, FontSize, Preferences};

/// Candidate values for a resolution attempt. The font size is kept raw so
/// that invalid input can be detected and cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    pub dark_mode: DarkMode,
    pub font_size: Option<String>,
}

impl Candidates {
    pub fn new(dark_mode: DarkMode, font_size: Option<String>) -> Self {
        Self {
            dark_mode,
            font_size,
        }
    }

    /// Dark mode unset, or font size missing or unknown.
    pub fn needs_negotiation(&self) -> bool {
        !self.dark_mode.is_set() || self.valid_font_size().is_none()
    }

    pub fn valid_font_size(&self) -> Option<FontSize> {
        self.font_size.as_deref().and_then(FontSize::parse)
    }
}

impl From<Preferences> for Candidates {
    fn from(prefs: Preferences) -> Self {
        Self {
            dark_mode: prefs.dark_mode,
            font_size: prefs.font_size.map(|s| s.ident().to_string()),
        }
    }
}

/// Result of one negotiation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Negotiated {
    /// The client answered the form. Both values are persisted.
    Accepted(Preferences),
    /// The client declined, cancelled, or never answered. Nothing changes.
    Declined,
    /// Candidates kept as supplied; an invalid font size has been cleared.
    Kept(Preferences),
}

#[async_trait]
pub trait NegotiationStrategy: Send + Sync {
    async fn negotiate(&self, candidates: &Candidates) -> Negotiated;
}

/// Ask the client for both preferences with a single elicitation round-trip.
pub struct InteractiveNegotiation<'a> {
    client: &'a dyn Elicitor,
}

impl<'a> InteractiveNegotiation<'a> {
    pub fn new(client: &'a dyn Elicitor) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NegotiationStrategy for InteractiveNegotiation<'_> {
    async fn negotiate(&self, candidates: &Candidates) -> Negotiated {
        let request = preferences_request(candidates.dark_mode);

        let response = match self.client.elicit(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Preference elicitation failed: {e}");
                return Negotiated::Declined;
            }
        };

        // Cancel is handled like decline.
        let content = match (response.action, response.content) {
            (ElicitationAction::Accept, Some(content)) => content,
            (action, _) => {
                tracing::info!("Preference elicitation not accepted: {action:?}");
                return Negotiated::Declined;
            }
        };

        let Some(dark_mode) = content.get(DARK_MODE_KEY).and_then(Value::as_bool) else {
            tracing::warn!("Elicitation accepted without a boolean darkMode, ignoring");
            return Negotiated::Declined;
        };

        let font_size = content
            .get(FONT_SIZE_KEY)
            .and_then(Value::as_str)
            .and_then(FontSize::parse)
            .unwrap_or(FontSize::Tiny);

        Negotiated::Accepted(Preferences::new(
            DarkMode::from_option(Some(dark_mode)),
            Some(font_size),
        ))
    }
}

/// Keep the supplied candidates without asking anything.
pub struct SilentNegotiation;

#[async_trait]
impl NegotiationStrategy for SilentNegotiation {
    async fn negotiate(&self, candidates: &Candidates) -> Negotiated {
        if candidates.font_size.is_some() && candidates.valid_font_size().is_none() {
            tracing::debug!(
                "Clearing unknown font size {:?}",
                candidates.font_size.as_deref().unwrap_or_default()
            );
        }
        Negotiated::Kept(Preferences::new(
            candidates.dark_mode,
            candidates.valid_font_size(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elicitation::{ElicitationRequest, ElicitationResponse};
    use crate::types::{LatexError, LatexResult};
    use serde_json::{json, Map};

    struct Scripted(LatexResult<ElicitationResponse>);

    #[async_trait]
    impl Elicitor for Scripted {
        async fn supports_elicitation(&self) -> bool {
            true
        }

        async fn elicit(&self, _request: ElicitationRequest) -> LatexResult<ElicitationResponse> {
            match &self.0 {
                Ok(response) => Ok(response.clone()),
                Err(e) => Err(LatexError::Elicitation(e.to_string())),
            }
        }
    }

    fn content(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_needs_negotiation() {
        let full = Candidates::new(DarkMode::Off, Some("huge".to_string()));
        assert!(!full.needs_negotiation());

        assert!(Candidates::new(DarkMode::Unset, Some("huge".to_string())).needs_negotiation());
        assert!(Candidates::new(DarkMode::On, None).needs_negotiation());
        assert!(Candidates::new(DarkMode::On, Some("Huge".to_string())).needs_negotiation());
    }

    #[tokio::test]
    async fn test_interactive_accept() {
        let client = Scripted(Ok(ElicitationResponse::accept(content(
            json!({ "darkMode": true, "fontSize": "LARGE" }),
        ))));
        let outcome = InteractiveNegotiation::new(&client)
            .negotiate(&Candidates::default())
            .await;
        assert_eq!(
            outcome,
            Negotiated::Accepted(Preferences::new(DarkMode::On, Some(FontSize::ExtraLarge)))
        );
    }

    #[tokio::test]
    async fn test_interactive_accept_without_font_size_defaults_to_tiny() {
        let client = Scripted(Ok(ElicitationResponse::accept(content(json!({ "darkMode": false })))));
        let outcome = InteractiveNegotiation::new(&client)
            .negotiate(&Candidates::default())
            .await;
        assert_eq!(
            outcome,
            Negotiated::Accepted(Preferences::new(DarkMode::Off, Some(FontSize::Tiny)))
        );
    }

    #[tokio::test]
    async fn test_interactive_decline_cancel_and_error() {
        let declined = Scripted(Ok(ElicitationResponse::decline()));
        let cancelled = Scripted(Ok(ElicitationResponse {
            action: ElicitationAction::Cancel,
            content: None,
        }));
        let empty_accept = Scripted(Ok(ElicitationResponse {
            action: ElicitationAction::Accept,
            content: None,
        }));
        let failed = Scripted(Err(LatexError::Elicitation("closed".to_string())));

        for client in [&declined, &cancelled, &empty_accept, &failed] {
            let outcome = InteractiveNegotiation::new(client)
                .negotiate(&Candidates::default())
                .await;
            assert_eq!(outcome, Negotiated::Declined);
        }
    }

    #[tokio::test]
    async fn test_silent_clears_invalid_font_size() {
        let outcome = SilentNegotiation
            .negotiate(&Candidates::new(DarkMode::On, Some("bogus".to_string())))
            .await;
        assert_eq!(outcome, Negotiated::Kept(Preferences::new(DarkMode::On, None)));

        let outcome = SilentNegotiation
            .negotiate(&Candidates::new(DarkMode::Unset, Some("small".to_string())))
            .await;
        assert_eq!(
            outcome,
            Negotiated::Kept(Preferences::new(DarkMode::Unset, Some(FontSize::Small)))
        );
    }
}
