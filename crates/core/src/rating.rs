//! Rating scale.
//!
//! Ratings are held internally as whole half-points in `0..=10` so that
//! comparisons and storage are exact. Clients see stars (`0.0..=5.0` in
//! steps of `0.5`). Values arriving on the legacy 0–10 scale (anything above
//! 5) are halved at the boundary.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Highest representable rating in half-points (5 stars).
pub const MAX_HALF_POINTS: i16 = 10;

/// Default rating for a new record (3 stars).
pub const DEFAULT_HALF_POINTS: i16 = 6;

/// A 0–5 star rating with half-star granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(i16);

impl Rating {
    /// Build from half-points, rejecting values outside `0..=10`.
    pub fn from_half_points(half_points: i16) -> Result<Self, CoreError> {
        if !(0..=MAX_HALF_POINTS).contains(&half_points) {
            return Err(CoreError::Validation(format!(
                "Rating must be between 0 and {MAX_HALF_POINTS} half-points, got {half_points}"
            )));
        }
        Ok(Self(half_points))
    }

    /// Build from half-points, clamping into range.
    ///
    /// Used when reading rows that are already constrained by the schema.
    pub fn clamped(half_points: i16) -> Self {
        Self(half_points.clamp(0, MAX_HALF_POINTS))
    }

    /// Build from a star value in `0.0..=5.0` that is a multiple of `0.5`.
    pub fn from_stars(stars: f64) -> Result<Self, CoreError> {
        if !stars.is_finite() || !(0.0..=5.0).contains(&stars) {
            return Err(CoreError::Validation(format!(
                "Rating must be between 0 and 5 stars, got {stars}"
            )));
        }
        let doubled = stars * 2.0;
        if (doubled - doubled.round()).abs() > f64::EPSILON {
            return Err(CoreError::Validation(format!(
                "Rating must be a multiple of 0.5, got {stars}"
            )));
        }
        Ok(Self(doubled.round() as i16))
    }

    /// Convert a client-supplied value, accepting the legacy 0–10 scale.
    ///
    /// Values above 5 are treated as 0–10 and halved.
    pub fn from_wire(value: f64) -> Result<Self, CoreError> {
        if value > 5.0 {
            Self::from_stars(value / 2.0)
        } else {
            Self::from_stars(value)
        }
    }

    pub fn half_points(self) -> i16 {
        self.0
    }

    pub fn stars(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self(DEFAULT_HALF_POINTS)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.stars())
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.stars())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Rating::from_wire(value).map_err(serde::de::Error::custom)
    }
}
