use super::{ad_payload, ensure, expect_status, CaseFuture, Fixture};
use serde_json::json;

pub(super) fn valid_ad(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let payload = json!({
            "sellerID": fx.fresh_seller().get(),
            "name": "Тестовое объявление",
            "price": 5000,
            "statistics": {"contacts": 3, "likes": 10, "viewCount": 5}
        });

        let resp = fx.post_item(&payload).await?;
        expect_status(&resp, &[200])?;
        let body = resp.json()?;
        ensure(
            body.get("status").is_some(),
            format!("create response has no status field: {}", body),
        )
    })
}

pub(super) fn seller_id_too_low(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.post_item(&ad_payload(100_000, "Test", 1000)).await?;
        expect_status(&resp, &[400])
    })
}

pub(super) fn seller_id_too_high(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.post_item(&ad_payload(1_000_000, "Test", 1000)).await?;
        expect_status(&resp, &[400])
    })
}

pub(super) fn missing_name(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let payload = json!({
            "sellerID": fx.fresh_seller().get(),
            "price": 1000,
            "statistics": {"contacts": 0, "likes": 0, "viewCount": 0}
        });
        let resp = fx.post_item(&payload).await?;
        expect_status(&resp, &[400])
    })
}

pub(super) fn negative_price(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx
            .post_item(&ad_payload(fx.fresh_seller().get(), "Test", -100))
            .await?;
        expect_status(&resp, &[400])
    })
}

pub(super) fn empty_name(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx
            .post_item(&ad_payload(fx.fresh_seller().get(), "", 1000))
            .await?;
        expect_status(&resp, &[400])
    })
}

// Free listings are a business decision; either answer is a clean one.
pub(super) fn zero_price(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx
            .post_item(&ad_payload(fx.fresh_seller().get(), "Test", 0))
            .await?;
        expect_status(&resp, &[200, 400])
    })
}

pub(super) fn missing_statistics(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let payload = json!({
            "sellerID": fx.fresh_seller().get(),
            "name": "Test",
            "price": 1000
        });
        let resp = fx.post_item(&payload).await?;
        expect_status(&resp, &[400])
    })
}

pub(super) fn negative_statistics(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let payload = json!({
            "sellerID": fx.fresh_seller().get(),
            "name": "Test",
            "price": 1000,
            "statistics": {"contacts": -1, "likes": -5, "viewCount": -10}
        });
        let resp = fx.post_item(&payload).await?;
        expect_status(&resp, &[200, 400])
    })
}
