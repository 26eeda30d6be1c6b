use super::{ensure, expect_array, expect_status, seller_of, CaseFuture, Fixture};

pub(super) fn existing_ad(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();
        let ad = fx.create_visible_ad(seller, "Test Ad").await?;

        let resp = fx.get(&format!("item/{}", ad.id)).await?;
        expect_status(&resp, &[200])?;
        let items = expect_array(&resp)?;
        let first = items
            .first()
            .ok_or_else(|| crate::AdprobeError::Check("item response is an empty array".into()))?;

        ensure(
            first.get("id").and_then(|v| v.as_str()) == Some(ad.id.as_str()),
            format!("item response id does not match {}", ad.id),
        )?;
        ensure(first.get("name").is_some(), "item response has no name")?;
        ensure(seller_of(first).is_some(), "item response has no sellerId")
    })
}

pub(super) fn unknown_id(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.get(&format!("item/{}", uuid::Uuid::new_v4())).await?;
        expect_status(&resp, &[404])
    })
}

pub(super) fn malformed_id(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.get("item/abc123").await?;
        expect_status(&resp, &[400, 404])
    })
}

pub(super) fn empty_id(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.get("item/").await?;
        expect_status(&resp, &[400, 404, 405])
    })
}
