//! Fluent construction of behavior spaces.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::event::{BehaviorEvent, MetadataValue};
use super::space::BehaviorSpace;
use crate::error::ConfigurationError;

/// Builds a [`BehaviorSpace`] one actor at a time.
///
/// ```
/// use intentum_core::behavior::BehaviorSpaceBuilder;
///
/// let space = BehaviorSpaceBuilder::new()
///     .with_actor("user")
///     .action("login")
///     .action("retry")
///     .build()
///     .unwrap();
/// assert_eq!(space.len(), 2);
/// ```
///
/// Calling `action` before any `with_actor` records the error; `build`
/// then returns [`ConfigurationError::MissingField`]`("actor")`.
#[derive(Debug, Default)]
pub struct BehaviorSpaceBuilder {
    space: BehaviorSpace,
    current_actor: Option<String>,
    error: Option<ConfigurationError>,
}

impl BehaviorSpaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the actor for subsequent actions.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.current_actor = Some(actor.into());
        self
    }

    /// Record an action for the current actor, stamped now.
    pub fn action(self, action: impl Into<String>) -> Self {
        self.action_at(action, Utc::now())
    }

    /// Record an action for the current actor at `occurred_at`.
    pub fn action_at(self, action: impl Into<String>, occurred_at: DateTime<Utc>) -> Self {
        self.action_with(action, occurred_at, BTreeMap::new())
    }

    /// Record an action with a timestamp and metadata.
    pub fn action_with(
        mut self,
        action: impl Into<String>,
        occurred_at: DateTime<Utc>,
        metadata: BTreeMap<String, MetadataValue>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        match &self.current_actor {
            Some(actor) => {
                let event = BehaviorEvent::new(actor.clone(), action, occurred_at)
                    .with_metadata_map(metadata);
                self.space.observe(event);
            }
            None => self.error = Some(ConfigurationError::MissingField("actor")),
        }
        self
    }

    /// Record a complete event directly.
    pub fn observe(mut self, event: BehaviorEvent) -> Self {
        self.space.observe(event);
        self
    }

    /// Set a space-level metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.space.set_metadata(key, value);
        self
    }

    /// Finish building.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded while building.
    pub fn build(self) -> Result<BehaviorSpace, ConfigurationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.space),
        }
    }
}
