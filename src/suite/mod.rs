//! Black-box probe cases for the ads service.
//!
//! Every [`Case`] receives a freshly built [`Fixture`] and returns `Ok(())`
//! when the service behaves as expected, or an [`AdprobeError::Check`]
//! describing the first mismatch. Cases never share state.

mod create;
mod integration;
mod item;
mod seller;
mod statistic;
mod transport;

pub mod runner;

pub use runner::{CaseReport, CaseStatus, SuiteReport, SuiteRunner};

use crate::client::{AdsClient, RawBody, RawResponse};
use crate::error::{AdprobeError, Result};
use crate::types::{Ad, CreateAdRequest, CreateAdResponse, SellerId};
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub type CaseFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Route a case exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    CreateItem,
    GetItem,
    SellerItems,
    Statistic,
    Integration,
    Transport,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Endpoint::CreateItem => "POST /item",
            Endpoint::GetItem => "GET /item/{id}",
            Endpoint::SellerItems => "GET /{sellerID}/item",
            Endpoint::Statistic => "GET /statistic/{id}",
            Endpoint::Integration => "integration",
            Endpoint::Transport => "transport",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy)]
pub struct Case {
    pub id: &'static str,
    pub title: &'static str,
    pub endpoint: Endpoint,
    run: fn(Fixture) -> CaseFuture,
}

impl Case {
    fn new(
        id: &'static str,
        title: &'static str,
        endpoint: Endpoint,
        run: fn(Fixture) -> CaseFuture,
    ) -> Self {
        Self {
            id,
            title,
            endpoint,
            run,
        }
    }

    pub fn run(&self, fixture: Fixture) -> CaseFuture {
        (self.run)(fixture)
    }

    /// Case-insensitive substring match on id or title.
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.id.to_lowercase().contains(&filter) || self.title.to_lowercase().contains(&filter)
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// All cases in execution order.
#[rustfmt::skip]
pub fn cases() -> Vec<Case> {
    use Endpoint::*;
    vec![
        Case::new("TC-001", "Create ad with valid data", CreateItem, create::valid_ad),
        Case::new("TC-002", "Reject sellerID below 111111", CreateItem, create::seller_id_too_low),
        Case::new("TC-003", "Reject sellerID above 999999", CreateItem, create::seller_id_too_high),
        Case::new("TC-004", "Reject ad without name", CreateItem, create::missing_name),
        Case::new("TC-005", "Reject negative price", CreateItem, create::negative_price),
        Case::new("TC-006", "Reject empty name", CreateItem, create::empty_name),
        Case::new("TC-007", "Zero price is accepted or rejected cleanly", CreateItem, create::zero_price),
        Case::new("TC-008", "Reject ad without statistics", CreateItem, create::missing_statistics),
        Case::new("TC-009", "Negative statistics are accepted or rejected cleanly", CreateItem, create::negative_statistics),
        Case::new("TC-010", "Fetch existing ad by id", GetItem, item::existing_ad),
        Case::new("TC-011", "Unknown ad id returns 404", GetItem, item::unknown_id),
        Case::new("TC-012", "Malformed ad id is rejected", GetItem, item::malformed_id),
        Case::new("TC-013", "Empty ad id is rejected", GetItem, item::empty_id),
        Case::new("TC-014", "List ads of a seller", SellerItems, seller::lists_created_ads),
        Case::new("TC-015", "Unknown seller yields an array", SellerItems, seller::unknown_seller),
        Case::new("TC-016", "Listing with sellerID below range", SellerItems, seller::seller_id_too_low),
        Case::new("TC-017", "Listing with sellerID above range", SellerItems, seller::seller_id_too_high),
        Case::new("TC-018", "Seller listing has unique ids", SellerItems, seller::unique_ids),
        Case::new("TC-019", "Fetch statistics of existing ad", Statistic, statistic::existing_ad),
        Case::new("TC-020", "Unknown ad statistics return 404", Statistic, statistic::unknown_id),
        Case::new("TC-021", "Malformed statistics id is rejected", Statistic, statistic::malformed_id),
        Case::new("TC-022", "View count never decreases", Statistic, statistic::view_count_monotonic),
        Case::new("TC-023", "Create, fetch, stats and seller listing agree", Integration, integration::full_cycle),
        Case::new("TC-024", "Several ads for one seller", Integration, integration::several_ads_one_seller),
        Case::new("TC-025", "Created ads get distinct ids", Integration, integration::distinct_ids),
        Case::new("TC-026", "Unsupported method on /item", Transport, transport::wrong_method),
        Case::new("TC-027", "Non-JSON content type", Transport, transport::wrong_content_type),
        Case::new("TC-028", "Malformed JSON body", Transport, transport::invalid_json),
    ]
}

/// An ad created during a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAd {
    pub seller_id: SellerId,
    pub name: String,
    pub item_id: Option<String>,
}

/// Per-case state, built fresh for every case.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub client: AdsClient,
    pub seller_id: SellerId,
    created: Vec<CreatedAd>,
}

impl Fixture {
    pub fn new(client: AdsClient) -> Self {
        Self {
            client,
            seller_id: SellerId::random(),
            created: Vec::new(),
        }
    }

    /// A seller id unrelated to this fixture's own.
    pub fn fresh_seller(&self) -> SellerId {
        loop {
            let candidate = SellerId::random();
            if candidate != self.seller_id {
                return candidate;
            }
        }
    }

    pub fn created(&self) -> &[CreatedAd] {
        &self.created
    }

    /// Create an ad with price 1000 and zeroed statistics.
    pub async fn create_ad(&mut self, seller_id: SellerId, name: &str) -> Result<CreateAdResponse> {
        let req = CreateAdRequest::new(seller_id, name, 1000);
        let resp = self.client.create_ad(&req).await?;
        self.created.push(CreatedAd {
            seller_id,
            name: name.to_string(),
            item_id: resp.item_id().map(str::to_string),
        });
        Ok(resp)
    }

    /// Create `names.len()` ads for `seller_id` and wait until the seller
    /// listing shows at least that many.
    pub async fn create_and_list(&mut self, seller_id: SellerId, names: &[&str]) -> Result<Vec<Ad>> {
        for name in names {
            self.create_ad(seller_id, name).await?;
        }
        let outcome = self
            .client
            .wait_for_seller_ads(seller_id, names.len())
            .await?;
        Ok(outcome.into_value().unwrap_or_default())
    }

    /// Create one ad and return it as it appears in the seller listing.
    pub async fn create_visible_ad(&mut self, seller_id: SellerId, name: &str) -> Result<Ad> {
        let resp = self.create_ad(seller_id, name).await?;
        ensure(!resp.status.is_empty(), "create response has an empty status")?;

        let outcome = self.client.wait_for_seller_ads(seller_id, 1).await?;
        outcome
            .into_value()
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| AdprobeError::check("created ad never appeared in the seller listing"))
    }

    pub async fn post_item(&self, payload: &Value) -> Result<RawResponse> {
        self.client
            .send_raw(Method::POST, "item", Some(RawBody::json(payload)))
            .await
    }

    pub async fn get(&self, path: &str) -> Result<RawResponse> {
        self.client.send_raw(Method::GET, path, None).await
    }
}

/// `POST /item` payload with the given fields and zeroed statistics.
pub(crate) fn ad_payload(seller_id: i64, name: &str, price: i64) -> Value {
    json!({
        "sellerID": seller_id,
        "name": name,
        "price": price,
        "statistics": {"contacts": 0, "likes": 0, "viewCount": 0}
    })
}

pub(crate) fn ensure(condition: bool, message: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(AdprobeError::check(message))
    }
}

pub(crate) fn expect_status(resp: &RawResponse, allowed: &[u16]) -> Result<()> {
    let status = resp.status.as_u16();
    if allowed.contains(&status) {
        return Ok(());
    }
    let expected = allowed
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join("/");
    Err(AdprobeError::check(format!(
        "expected status {}, got {} (body: {})",
        expected,
        status,
        truncate(&resp.body, 200)
    )))
}

/// Body parsed as a JSON array.
pub(crate) fn expect_array(resp: &RawResponse) -> Result<Vec<Value>> {
    match resp.json()? {
        Value::Array(items) => Ok(items),
        other => Err(AdprobeError::check(format!(
            "expected a JSON array, got {}",
            truncate(&other.to_string(), 200)
        ))),
    }
}

pub(crate) fn seller_of(ad: &Value) -> Option<i64> {
    ad.get("sellerId")
        .or_else(|| ad.get("sellerID"))
        .and_then(Value::as_i64)
}

pub(crate) fn ensure_unique_ids(ads: &[Ad]) -> Result<()> {
    let mut seen = HashSet::new();
    for ad in ads {
        ensure(seen.insert(ad.id.as_str()), format!("duplicate ad id {}", ad.id))?;
    }
    Ok(())
}

pub(crate) fn ensure_owned_by(ads: &[Ad], seller_id: SellerId) -> Result<()> {
    for ad in ads {
        ensure(
            ad.seller_id == seller_id.get(),
            format!(
                "ad {} belongs to seller {}, expected {}",
                ad.id, ad.seller_id, seller_id
            ),
        )?;
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
