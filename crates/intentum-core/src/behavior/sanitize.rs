//! Privacy-preserving export of behavior spaces.
//!
//! [`BehaviorSpace::sanitize`] produces a new space with actor and action
//! values masked and selected metadata keys redacted. The source space is
//! never modified.
//!
//! Event metadata keys are matched exactly. Space metadata keys are matched
//! case-insensitively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::event::{BehaviorEvent, MetadataValue};
use super::space::BehaviorSpace;
use crate::digest::ContentDigest;

/// Replacement value for redacted metadata.
pub const REDACTED: &str = "[redacted]";

/// Length of a hashed mask, in hex characters.
const HASH_MASK_LEN: usize = 16;

/// Controls how a space is sanitized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizationOptions {
    pub mask_actor: bool,
    pub mask_action: bool,
    /// Metadata keys whose values become [`REDACTED`].
    pub metadata_keys_to_redact: Vec<String>,
    /// Mask with a truncated SHA-256 (`true`) or with `placeholder` (`false`).
    pub use_hash: bool,
    pub placeholder: String,
}

impl Default for SanitizationOptions {
    fn default() -> Self {
        Self {
            mask_actor: true,
            mask_action: true,
            metadata_keys_to_redact: Vec::new(),
            use_hash: true,
            placeholder: "***".to_string(),
        }
    }
}

impl SanitizationOptions {
    /// Add metadata keys to redact.
    pub fn redact<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metadata_keys_to_redact.extend(keys.into_iter().map(Into::into));
        self
    }

    fn mask(&self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        if self.use_hash {
            ContentDigest::of(value.as_bytes()).to_upper_hex_prefix(HASH_MASK_LEN)
        } else {
            self.placeholder.clone()
        }
    }
}

impl BehaviorSpace {
    /// Return a sanitized copy of this space.
    pub fn sanitize(&self, options: &SanitizationOptions) -> BehaviorSpace {
        let mut out = BehaviorSpace::new();

        for event in self.events() {
            let actor = if options.mask_actor {
                options.mask(event.actor())
            } else {
                event.actor().to_string()
            };
            let action = if options.mask_action {
                options.mask(event.action())
            } else {
                event.action().to_string()
            };
            let mut metadata: BTreeMap<String, MetadataValue> = event.metadata().clone();
            for key in &options.metadata_keys_to_redact {
                if let Some(value) = metadata.get_mut(key) {
                    *value = MetadataValue::from(REDACTED);
                }
            }
            out.observe(
                BehaviorEvent::new(actor, action, event.occurred_at()).with_metadata_map(metadata),
            );
        }

        for (key, value) in self.metadata_map() {
            let redact = options
                .metadata_keys_to_redact
                .iter()
                .any(|k| k.eq_ignore_ascii_case(key));
            let value = if redact {
                MetadataValue::from(REDACTED)
            } else {
                value.clone()
            };
            out.set_metadata(key.clone(), value);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BehaviorSpace {
        let mut s = BehaviorSpace::new();
        s.observe(
            BehaviorEvent::now("alice@example.com", "login")
                .with_metadata("ip", "10.0.0.1")
                .with_metadata("device", "phone"),
        );
        s.set_metadata("Email", "alice@example.com");
        s.set_metadata("tenant", "acme");
        s
    }

    #[test]
    fn hash_mask_is_sixteen_uppercase_hex() {
        let out = sample().sanitize(&SanitizationOptions::default());
        let actor = out.events()[0].actor();
        assert_eq!(actor.len(), 16);
        assert!(actor.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(actor, "alice@example.com");
    }

    #[test]
    fn hash_mask_is_stable() {
        let a = sample().sanitize(&SanitizationOptions::default());
        let b = sample().sanitize(&SanitizationOptions::default());
        assert_eq!(a.events()[0].actor(), b.events()[0].actor());
    }

    #[test]
    fn placeholder_mask() {
        let opts = SanitizationOptions {
            use_hash: false,
            ..SanitizationOptions::default()
        };
        let out = sample().sanitize(&opts);
        assert_eq!(out.events()[0].actor(), "***");
        assert_eq!(out.events()[0].action(), "***");
    }

    #[test]
    fn unmasked_fields_pass_through() {
        let opts = SanitizationOptions {
            mask_action: false,
            ..SanitizationOptions::default()
        };
        let out = sample().sanitize(&opts);
        assert_eq!(out.events()[0].action(), "login");
    }

    #[test]
    fn empty_values_stay_empty() {
        let mut s = BehaviorSpace::new();
        s.observe(BehaviorEvent::now("", "x"));
        let out = s.sanitize(&SanitizationOptions::default());
        assert_eq!(out.events()[0].actor(), "");
    }

    #[test]
    fn event_metadata_redaction_is_exact() {
        let opts = SanitizationOptions::default().redact(["ip", "DEVICE"]);
        let out = sample().sanitize(&opts);
        let meta = out.events()[0].metadata();
        assert_eq!(meta["ip"].as_str(), Some(REDACTED));
        assert_eq!(meta["device"].as_str(), Some("phone"));
    }

    #[test]
    fn space_metadata_redaction_ignores_case() {
        let opts = SanitizationOptions::default().redact(["email"]);
        let out = sample().sanitize(&opts);
        assert_eq!(out.metadata("Email").and_then(|v| v.as_str()), Some(REDACTED));
        assert_eq!(out.metadata("tenant").and_then(|v| v.as_str()), Some("acme"));
    }

    #[test]
    fn source_space_is_untouched() {
        let source = sample();
        let _ = source.sanitize(&SanitizationOptions::default().redact(["ip"]));
        assert_eq!(source.events()[0].actor(), "alice@example.com");
        assert_eq!(source.events()[0].metadata()["ip"].as_str(), Some("10.0.0.1"));
    }
}
