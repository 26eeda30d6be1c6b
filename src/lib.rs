//! # adprobe
//!
//! Black-box probe for a classified-ads HTTP service (create ad, fetch ad by
//! id, list ads by seller, fetch statistics).
//!
//! Ads created through the service show up in seller listings only after a
//! short propagation delay, so reads that depend on a preceding write go
//! through the [`poll::Poller`]: it repeats a read until a predicate accepts
//! the result or the attempt budget runs out.
//!
//! ```rust,no_run
//! use adprobe::{AdsClient, CreateAdRequest, ProbeConfig, SellerId};
//!
//! # async fn run() -> adprobe::Result<()> {
//! let client = AdsClient::new(ProbeConfig::from_env()?)?;
//! let seller = SellerId::random();
//! client.create_ad(&CreateAdRequest::new(seller, "Bike", 5000)).await?;
//!
//! let outcome = client.wait_for_seller_ads(seller, 1).await?;
//! println!("visible after {} reads", outcome.attempts());
//! # Ok(())
//! # }
//! ```
//!
//! The [`suite`] module bundles the full set of black-box cases; the
//! companion `adprobe-cli` crate runs them from the command line.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod poll;
pub mod suite;
pub mod types;

pub use client::{AdsClient, RawBody, RawResponse};
pub use config::ProbeConfig;
pub use error::{AdprobeError, Result};
pub use poll::{cancel_pair, CancelReason, HasItems, PollConfig, PollOutcome, Poller};
pub use types::{Ad, CreateAdRequest, CreateAdResponse, SellerId, Statistics};
