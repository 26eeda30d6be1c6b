use super::{expect_status, CaseFuture, Fixture};
use crate::client::RawBody;
use http::Method;
use serde_json::json;

pub(super) fn wrong_method(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx
            .client
            .send_raw(Method::PUT, "item", Some(RawBody::json(&json!({}))))
            .await?;
        expect_status(&resp, &[400, 404, 405])
    })
}

pub(super) fn wrong_content_type(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx
            .client
            .send_raw(
                Method::POST,
                "item",
                Some(RawBody::text("text/plain", "not json")),
            )
            .await?;
        expect_status(&resp, &[400, 415])
    })
}

pub(super) fn invalid_json(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx
            .client
            .send_raw(
                Method::POST,
                "item",
                Some(RawBody::text("application/json", "{invalid json}")),
            )
            .await?;
        expect_status(&resp, &[400])
    })
}
