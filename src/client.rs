use crate::config::ProbeConfig;
use crate::error::{AdprobeError, Result};
use crate::poll::{PollOutcome, Poller};
use crate::types::{Ad, CreateAdRequest, CreateAdResponse, SellerId, Statistics};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;

/// Request body for [`AdsClient::send_raw`], sent verbatim.
#[derive(Debug, Clone)]
pub struct RawBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RawBody {
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            content_type: "application/json".to_string(),
            bytes: value.to_string().into_bytes(),
        }
    }

    pub fn text(content_type: &str, body: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            bytes: body.as_bytes().to_vec(),
        }
    }
}

/// Status and body of a request whose status is inspected by the caller.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client for the ads service.
#[derive(Debug, Clone)]
pub struct AdsClient {
    config: ProbeConfig,
    http_client: reqwest::Client,
    poller: Poller,
}

impl AdsClient {
    /// # Errors
    ///
    /// Returns [`AdprobeError::Config`] if the underlying HTTP client cannot
    /// be built.
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AdprobeError::Config(format!("Failed to build HTTP client: {}", e)))?;
        let poller = Poller::new(config.poll);

        Ok(Self {
            config,
            http_client,
            poller,
        })
    }

    /// Replace the poller used by [`AdsClient::wait_for_seller_ads`], e.g.
    /// to attach a cancel token.
    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    /// `POST /item`
    pub async fn create_ad(&self, req: &CreateAdRequest) -> Result<CreateAdResponse> {
        let url = self.config.url("item");
        let response = self
            .http_client
            .post(&url)
            .json(req)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;

        let resp: CreateAdResponse = decode(Method::POST, &url, response).await?;
        tracing::debug!(
            "created ad for seller {}: {}",
            req.seller_id,
            resp.status
        );
        Ok(resp)
    }

    /// `GET /item/{id}`. The service answers with a one-element array.
    pub async fn get_ad(&self, id: &str) -> Result<Vec<Ad>> {
        self.get_json(&format!("item/{}", id)).await
    }

    /// `GET /{sellerID}/item`
    pub async fn list_seller_ads(&self, seller_id: SellerId) -> Result<Vec<Ad>> {
        self.get_json(&format!("{}/item", seller_id)).await
    }

    /// `GET /statistic/{id}`
    pub async fn get_statistics(&self, id: &str) -> Result<Vec<Statistics>> {
        self.get_json(&format!("statistic/{}", id)).await
    }

    /// Poll the seller listing until at least `min_count` ads are visible.
    ///
    /// Listing freshly created ads is eventually consistent; an exhausted
    /// outcome still carries the last listing so the caller decides whether
    /// a short list is acceptable.
    pub async fn wait_for_seller_ads(
        &self,
        seller_id: SellerId,
        min_count: usize,
    ) -> Result<PollOutcome<Vec<Ad>>> {
        let outcome = self
            .poller
            .poll_until(
                || self.list_seller_ads(seller_id),
                |ads: &Vec<Ad>| ads.len() >= min_count,
            )
            .await?;

        if !outcome.is_satisfied() {
            tracing::warn!(
                "seller {} listing has {} ads after {} attempts, wanted {}",
                seller_id,
                outcome.value().map_or(0, Vec::len),
                outcome.attempts(),
                min_count
            );
        }
        Ok(outcome)
    }

    /// Send an arbitrary request and return its status and body without
    /// judging the status.
    pub async fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<RawBody>,
    ) -> Result<RawResponse> {
        let url = self.config.url(path);
        let mut request = self.http_client.request(method, &url);
        if let Some(body) = body {
            request = request
                .header(http::header::CONTENT_TYPE, body.content_type)
                .body(body.bytes);
        }

        let response = request.send().await.map_err(|e| transport(&url, e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport(&url, e))?;

        Ok(RawResponse { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.url(path);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&url, e))?;

        decode(Method::GET, &url, response).await
    }
}

async fn decode<T: DeserializeOwned>(
    method: Method,
    url: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AdprobeError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await.map_err(|e| transport(url, e))?;
    serde_json::from_str(&text).map_err(|e| AdprobeError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn transport(url: &str, e: reqwest::Error) -> AdprobeError {
    AdprobeError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::PollConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, attempts: u32) -> AdsClient {
        let config = ProbeConfig::new(
            &format!("{}/api/1", server.uri()),
            Duration::from_secs(5),
            PollConfig::new(attempts, Duration::ZERO).unwrap(),
        )
        .unwrap();
        AdsClient::new(config).unwrap()
    }

    fn ad(id: &str, seller: i64) -> serde_json::Value {
        json!({
            "id": id,
            "sellerId": seller,
            "name": "Test Ad",
            "price": 1000,
            "statistics": {"likes": 0, "viewCount": 0, "contacts": 0},
            "createdAt": "2025-01-01 00:00:00.000 +0300 +0300"
        })
    }

    #[tokio::test]
    async fn test_create_ad_posts_wire_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/1/item"))
            .and(body_json(json!({
                "sellerID": 456789,
                "name": "Lamp",
                "price": 250,
                "statistics": {"likes": 0, "viewCount": 0, "contacts": 0}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Сохранили объявление - 6f0e2c34-6d0e-4c1b-8f0c-2b9c8a1d4e55"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let req = CreateAdRequest::new(SellerId::new(456_789).unwrap(), "Lamp", 250);
        let resp = client.create_ad(&req).await.unwrap();

        assert_eq!(
            resp.item_id(),
            Some("6f0e2c34-6d0e-4c1b-8f0c-2b9c8a1d4e55")
        );
    }

    #[tokio::test]
    async fn test_non_success_maps_to_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/item/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let err = client.get_ad("missing").await.unwrap_err();

        assert_eq!(err.status_code(), Some(StatusCode::NOT_FOUND));
        match err {
            AdprobeError::Status { body, method, .. } => {
                assert_eq!(body, "not found");
                assert_eq!(method, "GET");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/statistic/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let err = client.get_statistics("abc").await.unwrap_err();
        assert!(matches!(err, AdprobeError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = ProbeConfig::new(
            "http://127.0.0.1:1/api/1",
            Duration::from_secs(2),
            PollConfig::default(),
        )
        .unwrap();
        let client = AdsClient::new(config).unwrap();

        let err = client
            .list_seller_ads(SellerId::new(222_222).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_transport(), "{:?}", err);
    }

    #[tokio::test]
    async fn test_wait_for_seller_ads_rides_out_lag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/333333/item"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/1/333333/item"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([ad("a1", 333333)])),
            )
            .with_priority(2)
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        let outcome = client
            .wait_for_seller_ads(SellerId::new(333_333).unwrap(), 1)
            .await
            .unwrap();

        assert!(outcome.is_satisfied());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.into_value().unwrap()[0].id, "a1");
    }

    #[tokio::test]
    async fn test_wait_for_seller_ads_exhausts_without_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/444444/item"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, 3);
        let outcome = client
            .wait_for_seller_ads(SellerId::new(444_444).unwrap(), 1)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Exhausted {
                value: vec![],
                attempts: 3
            }
        );
    }

    #[tokio::test]
    async fn test_wait_for_seller_ads_does_not_retry_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/555555/item"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        let err = client
            .wait_for_seller_ads(SellerId::new(555_555).unwrap(), 1)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_send_raw_keeps_status_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/1/item"))
            .and(header("content-type", "text/plain"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"result": "bad"})))
            .mount(&server)
            .await;

        let client = client_for(&server, 1);
        let resp = client
            .send_raw(
                Method::POST,
                "item",
                Some(RawBody::text("text/plain", "not json")),
            )
            .await
            .unwrap();

        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.json().unwrap()["result"], "bad");
    }
}
