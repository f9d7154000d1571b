//! Ratings buyers leave on completed orders.

use chrono::{DateTime, Utc};
use common::{OrderId, RatingId, SupplierId, VendorId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for scores outside the 1–5 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rating score must be between 1 and 5, got {0}")]
pub struct ScoreOutOfRange(pub u8);

/// A rating score, always between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Creates a score, rejecting values outside 1–5.
    pub fn new(value: u8) -> Result<Self, ScoreOutOfRange> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ScoreOutOfRange(value))
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A buyer's rating of a completed order.
///
/// At most one rating exists per (order, vendor) pair; resubmitting
/// replaces the score and text and bumps `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: RatingId,
    pub order_id: OrderId,
    pub supplier_id: SupplierId,
    pub vendor_id: VendorId,
    pub score: Score,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rating as submitted by a vendor.
///
/// The supplier is not part of the submission; the store derives it
/// from the order being rated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRating {
    pub order_id: OrderId,
    pub vendor_id: VendorId,
    pub score: Score,
    pub review_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_accepts_one_through_five() {
        for value in 1..=5 {
            assert_eq!(Score::new(value).unwrap().value(), value);
        }
    }

    #[test]
    fn score_rejects_out_of_range() {
        assert_eq!(Score::new(0), Err(ScoreOutOfRange(0)));
        assert_eq!(Score::new(6), Err(ScoreOutOfRange(6)));
    }

    #[test]
    fn score_deserialization_validates() {
        let ok: Score = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);

        assert!(serde_json::from_str::<Score>("9").is_err());
    }

    #[test]
    fn rating_serialization_roundtrip() {
        let rating = Rating {
            id: RatingId::new(),
            order_id: OrderId::new(),
            supplier_id: SupplierId::new(),
            vendor_id: VendorId::new(),
            score: Score::new(5).unwrap(),
            review_text: Some("Fresh stock, on time".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&rating).unwrap();
        let deserialized: Rating = serde_json::from_str(&json).unwrap();
        assert_eq!(rating, deserialized);
    }
}
