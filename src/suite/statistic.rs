use super::{ensure, expect_array, expect_status, CaseFuture, Fixture};
use serde_json::Value;
use std::time::Duration;

/// Upper bound on the pause between the two statistics reads of TC-022.
const VIEW_COUNT_PAUSE: Duration = Duration::from_secs(1);

pub(super) fn existing_ad(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();
        let ad = fx.create_visible_ad(seller, "Test Ad").await?;

        let resp = fx.get(&format!("statistic/{}", ad.id)).await?;
        expect_status(&resp, &[200])?;
        let items = expect_array(&resp)?;
        let stats = items.first().ok_or_else(|| {
            crate::AdprobeError::Check("statistics response is an empty array".into())
        })?;

        ensure(
            ["likes", "viewCount", "contacts"]
                .iter()
                .any(|key| stats.get(key).is_some()),
            format!("statistics response has no counters: {}", stats),
        )
    })
}

pub(super) fn unknown_id(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx
            .get(&format!("statistic/{}", uuid::Uuid::new_v4()))
            .await?;
        expect_status(&resp, &[404])
    })
}

pub(super) fn malformed_id(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.get("statistic/abc123").await?;
        expect_status(&resp, &[400, 404])
    })
}

pub(super) fn view_count_monotonic(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();
        let ad = fx.create_visible_ad(seller, "Test Ad").await?;
        let path = format!("statistic/{}", ad.id);

        let first = fx.get(&path).await?;
        expect_status(&first, &[200])?;

        let pause = fx.client.config().poll.delay().min(VIEW_COUNT_PAUSE);
        tokio::time::sleep(pause).await;

        let second = fx.get(&path).await?;
        expect_status(&second, &[200])?;

        match (view_count(&first.json()?), view_count(&second.json()?)) {
            (Some(before), Some(after)) => ensure(
                after >= before,
                format!("view count went from {} down to {}", before, after),
            ),
            _ => Ok(()),
        }
    })
}

/// `viewCount` from either `[{...}]` or `{...}`.
fn view_count(body: &Value) -> Option<i64> {
    let stats = match body {
        Value::Array(items) => items.first()?,
        Value::Object(_) => body,
        _ => return None,
    };
    stats.get("viewCount").and_then(Value::as_i64)
}
