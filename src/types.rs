use crate::error::{AdprobeError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seller identifier accepted by the service: a six-digit integer in
/// `111111..=999999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SellerId(i64);

impl SellerId {
    pub const MIN: i64 = 111_111;
    pub const MAX: i64 = 999_999;

    /// # Errors
    ///
    /// Returns [`AdprobeError::InvalidSellerId`] outside `MIN..=MAX`.
    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AdprobeError::InvalidSellerId(value))
        }
    }

    /// Skips range validation. Negative probes use this to send ids the
    /// service is expected to reject.
    pub fn new_unchecked(value: i64) -> Self {
        Self(value)
    }

    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(Self::MIN..=Self::MAX))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

impl fmt::Display for SellerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engagement counters attached to an ad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub likes: i64,
    #[serde(rename = "viewCount", default)]
    pub view_count: i64,
    #[serde(default)]
    pub contacts: i64,
}

/// Body of `POST /item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAdRequest {
    #[serde(rename = "sellerID")]
    pub seller_id: SellerId,
    pub name: String,
    pub price: i64,
    pub statistics: Statistics,
}

impl CreateAdRequest {
    pub fn new(seller_id: SellerId, name: impl Into<String>, price: i64) -> Self {
        Self {
            seller_id,
            name: name.into(),
            price,
            statistics: Statistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = statistics;
        self
    }
}

/// Response of `POST /item`, e.g.
/// `{"status": "Сохранили объявление - 0b4f3d8e-6f5a-4c43-9a77-6e1f6f3b9a10"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAdResponse {
    pub status: String,
}

impl CreateAdResponse {
    /// Item id embedded at the end of the status text, if it is a UUID.
    pub fn item_id(&self) -> Option<&str> {
        let candidate = self
            .status
            .rsplit(" - ")
            .next()
            .unwrap_or(&self.status)
            .trim();
        uuid::Uuid::parse_str(candidate).ok().map(|_| candidate)
    }
}

/// An ad as returned by `GET /item/{id}` and `GET /{sellerID}/item`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: String,
    #[serde(rename = "sellerId", alias = "sellerID")]
    pub seller_id: i64,
    pub name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
