//! # Behavior Vectors
//!
//! A [`BehaviorVector`] maps dimension keys (`actor:action`) to numeric
//! weights. Dimensions are held in a `BTreeMap`, so iteration order is
//! always sorted by key. Two vectors with the same dimensions therefore
//! serialize and hash identically regardless of observation order.
//!
//! ## Normalization
//!
//! | Strategy | Effect |
//! |----------|--------|
//! | `None` | raw counts |
//! | `Cap` | `min(value, cap)` |
//! | `L1` | scale so the values sum to 1 |
//! | `SoftCap` | `min(1, value / cap)` |
//!
//! `Cap` and `SoftCap` with a cap of zero or less leave the raw counts as-is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How dimension values are normalized after counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorNormalization {
    /// Raw counts.
    #[default]
    None,
    /// Hard cap per dimension.
    Cap,
    /// Scale so dimension values sum to 1.
    L1,
    /// `min(1, value / cap)` per dimension.
    SoftCap,
}

impl VectorNormalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Cap => "cap",
            Self::L1 => "l1",
            Self::SoftCap => "soft_cap",
        }
    }
}

impl std::fmt::Display for VectorNormalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for [`BehaviorSpace::to_vector_with`](super::BehaviorSpace::to_vector_with).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToVectorOptions {
    /// Normalization strategy.
    #[serde(default)]
    pub normalization: VectorNormalization,
    /// Cap used by `Cap` and `SoftCap`. Zero or less means no cap.
    #[serde(default)]
    pub cap_per_dimension: f64,
}

impl ToVectorOptions {
    pub fn new(normalization: VectorNormalization) -> Self {
        Self {
            normalization,
            cap_per_dimension: 0.0,
        }
    }

    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap_per_dimension = cap;
        self
    }

    /// L1 normalization.
    pub fn l1() -> Self {
        Self::new(VectorNormalization::L1)
    }

    /// Hard cap at `cap`.
    pub fn cap(cap: f64) -> Self {
        Self::new(VectorNormalization::Cap).with_cap(cap)
    }

    /// Soft cap scaled into `[0, 1]`.
    pub fn soft_cap(cap: f64) -> Self {
        Self::new(VectorNormalization::SoftCap).with_cap(cap)
    }
}

/// Dimension-keyed numeric summary of a behavior space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorVector {
    dimensions: BTreeMap<String, f64>,
}

impl BehaviorVector {
    /// Build a vector from explicit dimensions.
    ///
    /// Normal callers obtain vectors from a space; this exists for tests and
    /// for callers that supply a precomputed vector to a model.
    pub fn from_dimensions(dimensions: BTreeMap<String, f64>) -> Self {
        Self { dimensions }
    }

    /// Count one unit per dimension key.
    pub(crate) fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut dimensions = BTreeMap::new();
        for key in keys {
            *dimensions.entry(key).or_insert(0.0) += 1.0;
        }
        Self { dimensions }
    }

    pub fn dimensions(&self) -> &BTreeMap<String, f64> {
        &self.dimensions
    }

    /// Value for a dimension, if present.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.dimensions.get(key).copied()
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Iterate `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.dimensions.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of all dimension values.
    pub fn total(&self) -> f64 {
        self.dimensions.values().sum()
    }

    /// Return a normalized copy of this vector.
    pub fn normalized(&self, options: &ToVectorOptions) -> Self {
        let cap = options.cap_per_dimension;
        let dimensions = match options.normalization {
            VectorNormalization::None => self.dimensions.clone(),
            VectorNormalization::Cap if cap > 0.0 => self
                .dimensions
                .iter()
                .map(|(k, v)| (k.clone(), v.min(cap)))
                .collect(),
            VectorNormalization::SoftCap if cap > 0.0 => self
                .dimensions
                .iter()
                .map(|(k, v)| (k.clone(), (v / cap).min(1.0)))
                .collect(),
            VectorNormalization::Cap | VectorNormalization::SoftCap => self.dimensions.clone(),
            VectorNormalization::L1 => {
                let sum: f64 = self.dimensions.values().map(|v| v.abs()).sum();
                if sum > 0.0 {
                    self.dimensions
                        .iter()
                        .map(|(k, v)| (k.clone(), v / sum))
                        .collect()
                } else {
                    self.dimensions.clone()
                }
            }
        };
        Self { dimensions }
    }
}
