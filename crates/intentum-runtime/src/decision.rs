//! # Policy Decisions
//!
//! The closed set of governance outcomes. Call sites branch on
//! [`PolicyDecision`] with exhaustive `match`; there is no string form in
//! the engine itself. Strings appear only at the edges: metrics labels,
//! log fields, and declarative policy documents.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating an intent against a policy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum PolicyDecision {
    Allow,
    /// Default when no rule matches or a rule fails.
    #[default]
    Observe,
    Warn,
    Block,
    Escalate,
    RequireAuth,
    RateLimit,
}

impl PolicyDecision {
    pub fn all() -> &'static [PolicyDecision] {
        &[
            Self::Allow,
            Self::Observe,
            Self::Warn,
            Self::Block,
            Self::Escalate,
            Self::RequireAuth,
            Self::RateLimit,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Observe => "Observe",
            Self::Warn => "Warn",
            Self::Block => "Block",
            Self::Escalate => "Escalate",
            Self::RequireAuth => "RequireAuth",
            Self::RateLimit => "RateLimit",
        }
    }

    /// Parse a decision name, ignoring case, `_` and `-`
    /// (`"require_auth"`, `"RequireAuth"` and `"require-auth"` are equal).
    pub fn parse(name: &str) -> Option<Self> {
        let folded: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect();
        Self::all()
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(&folded))
    }
}

impl std::fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_seven_variants() {
        assert_eq!(PolicyDecision::all().len(), 7);
    }

    #[test]
    fn parse_is_lenient_about_case_and_separators() {
        assert_eq!(PolicyDecision::parse("block"), Some(PolicyDecision::Block));
        assert_eq!(PolicyDecision::parse("RequireAuth"), Some(PolicyDecision::RequireAuth));
        assert_eq!(PolicyDecision::parse("rate_limit"), Some(PolicyDecision::RateLimit));
        assert_eq!(PolicyDecision::parse(" require-auth "), Some(PolicyDecision::RequireAuth));
        assert_eq!(PolicyDecision::parse("deny"), None);
    }

    #[test]
    fn parse_inverts_as_str() {
        for d in PolicyDecision::all() {
            assert_eq!(PolicyDecision::parse(d.as_str()), Some(*d));
        }
    }

    #[test]
    fn default_is_observe() {
        assert_eq!(PolicyDecision::default(), PolicyDecision::Observe);
    }

    #[test]
    fn serde_uses_variant_names() {
        let json = serde_json::to_string(&PolicyDecision::RequireAuth).unwrap();
        assert_eq!(json, "\"RequireAuth\"");
    }
}
