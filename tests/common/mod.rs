//! In-process stand-in for the ads service.
//!
//! Mirrors the public service's validation rules and, like it, lists a
//! freshly created ad under its seller only after a few listing reads.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug)]
struct StoredAd {
    id: Uuid,
    seller_id: i64,
    name: String,
    price: i64,
    likes: i64,
    view_count: i64,
    contacts: i64,
    hidden_reads: u32,
}

impl StoredAd {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "sellerId": self.seller_id,
            "name": self.name,
            "price": self.price,
            "statistics": self.stats_json(),
            "createdAt": "2025-01-01 12:00:00.000000 +0300 +0300"
        })
    }

    fn stats_json(&self) -> Value {
        json!({
            "likes": self.likes,
            "viewCount": self.view_count,
            "contacts": self.contacts
        })
    }
}

#[derive(Debug, Default)]
struct MockState {
    ads: Vec<StoredAd>,
    listing_lag: u32,
    listing_reads: u32,
    create_calls: u32,
}

#[allow(dead_code)]
pub struct MockAdsService {
    pub base_url: String,
    state: Arc<Mutex<MockState>>,
}

#[allow(dead_code)]
impl MockAdsService {
    /// Seller listing requests served so far.
    pub fn listing_reads(&self) -> u32 {
        self.state.lock().unwrap().listing_reads
    }

    pub fn create_calls(&self) -> u32 {
        self.state.lock().unwrap().create_calls
    }

    pub fn stored_ads(&self) -> usize {
        self.state.lock().unwrap().ads.len()
    }
}

#[allow(dead_code)]
pub async fn spawn_ads_service() -> MockAdsService {
    spawn_ads_service_with_lag(2).await
}

/// `listing_lag`: number of seller-listing reads a new ad stays hidden for.
#[allow(dead_code)]
pub async fn spawn_ads_service_with_lag(listing_lag: u32) -> MockAdsService {
    let state = Arc::new(Mutex::new(MockState {
        listing_lag,
        ..MockState::default()
    }));

    let app = Router::new()
        .route("/api/1/*path", any(dispatch))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockAdsService {
        base_url: format!("http://{}/api/1", addr),
        state,
    }
}

type Shared = Arc<Mutex<MockState>>;

async fn dispatch(
    State(state): State<Shared>,
    method: Method,
    Path(path): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = path.trim_start_matches('/').to_string();
    let segments: Vec<&str> = path.split('/').collect();

    match (method, segments.as_slice()) {
        (Method::POST, ["item"]) => create_item(&state, &headers, &body),
        (_, ["item"]) => error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
        (Method::GET, ["item", id]) => get_item(&state, id),
        (Method::GET, ["statistic", id]) => get_statistic(&state, id),
        (Method::GET, [seller, "item"]) => list_seller(&state, seller),
        _ => error(StatusCode::NOT_FOUND, "route not found"),
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "result": {"message": message, "messages": {}},
            "status": status.as_u16().to_string()
        })),
    )
        .into_response()
}

fn create_item(state: &Shared, headers: &HeaderMap, body: &Bytes) -> Response {
    state.lock().unwrap().create_calls += 1;

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !is_json {
        return error(StatusCode::BAD_REQUEST, "content type must be application/json");
    }

    let payload: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return error(StatusCode::BAD_REQUEST, "invalid json"),
    };

    let seller_id = match payload.get("sellerID").and_then(Value::as_i64) {
        Some(id) if (111_111..=999_999).contains(&id) => id,
        _ => return error(StatusCode::BAD_REQUEST, "sellerID is invalid"),
    };
    let name = match payload.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return error(StatusCode::BAD_REQUEST, "name is required"),
    };
    let price = match payload.get("price").and_then(Value::as_i64) {
        Some(price) if price >= 0 => price,
        _ => return error(StatusCode::BAD_REQUEST, "price is invalid"),
    };
    let Some(stats) = payload.get("statistics").and_then(Value::as_object) else {
        return error(StatusCode::BAD_REQUEST, "statistics is required");
    };
    let counter = |key: &str| stats.get(key).and_then(Value::as_i64).unwrap_or(0);
    let (likes, view_count, contacts) = (counter("likes"), counter("viewCount"), counter("contacts"));
    if likes < 0 || view_count < 0 || contacts < 0 {
        return error(StatusCode::BAD_REQUEST, "statistics must be non-negative");
    }

    let id = Uuid::new_v4();
    let mut guard = state.lock().unwrap();
    let hidden_reads = guard.listing_lag;
    guard.ads.push(StoredAd {
        id,
        seller_id,
        name,
        price,
        likes,
        view_count,
        contacts,
        hidden_reads,
    });

    Json(json!({ "status": format!("Сохранили объявление - {}", id) })).into_response()
}

fn parse_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| error(StatusCode::BAD_REQUEST, "id is not a uuid"))
}

fn get_item(state: &Shared, raw_id: &str) -> Response {
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let guard = state.lock().unwrap();
    match guard.ads.iter().find(|ad| ad.id == id) {
        Some(ad) => Json(json!([ad.to_json()])).into_response(),
        None => error(StatusCode::NOT_FOUND, "item not found"),
    }
}

fn get_statistic(state: &Shared, raw_id: &str) -> Response {
    let id = match parse_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let mut guard = state.lock().unwrap();
    match guard.ads.iter_mut().find(|ad| ad.id == id) {
        Some(ad) => {
            ad.view_count += 1;
            Json(json!([ad.stats_json()])).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "statistic not found"),
    }
}

fn list_seller(state: &Shared, raw_seller: &str) -> Response {
    let Ok(seller_id) = raw_seller.parse::<i64>() else {
        return error(StatusCode::BAD_REQUEST, "sellerID is not a number");
    };

    let mut guard = state.lock().unwrap();
    guard.listing_reads += 1;

    let mut visible = Vec::new();
    for ad in guard.ads.iter_mut().filter(|ad| ad.seller_id == seller_id) {
        if ad.hidden_reads > 0 {
            ad.hidden_reads -= 1;
        } else {
            visible.push(ad.to_json());
        }
    }
    Json(Value::Array(visible)).into_response()
}
