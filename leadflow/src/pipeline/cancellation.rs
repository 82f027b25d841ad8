//! Cooperative cancellation checked between leads.

use std::sync::{Arc, OnceLock};

/// Stops a campaign from taking new leads.
///
/// Clones share state. A lead already in flight is always finished, and only
/// the first reason given is kept.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    reason: Arc<OnceLock<String>>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Later calls are ignored.
    pub fn cancel(&self, reason: impl Into<String>) {
        let _ = self.reason.set(reason.into());
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.reason.get().is_some()
    }

    /// Reason passed to the first `cancel` call.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_live() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert_eq!(token.reason(), None);
    }

    #[test]
    fn test_first_reason_wins_across_clones() {
        let token = CancellationToken::new();
        let handle = token.clone();
        handle.cancel("operator stop");
        token.cancel("shutdown");

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some("operator stop"));
    }
}
