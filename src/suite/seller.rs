use super::{
    ensure, ensure_owned_by, ensure_unique_ids, expect_array, expect_status, CaseFuture, Fixture,
};

pub(super) fn lists_created_ads(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();
        let ads = fx
            .create_and_list(seller, &["Ad 1", "Ad 2", "Ad 3"])
            .await?;

        ensure(
            ads.len() >= 3,
            format!("expected at least 3 ads, got {}", ads.len()),
        )?;
        ensure_owned_by(&ads, seller)
    })
}

// An unknown seller may legitimately have nothing listed yet; only the
// response shape is checked.
pub(super) fn unknown_seller(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.get(&format!("{}/item", fx.fresh_seller())).await?;
        expect_status(&resp, &[200])?;
        expect_array(&resp).map(|_| ())
    })
}

pub(super) fn seller_id_too_low(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.get("100000/item").await?;
        expect_status(&resp, &[200, 400])
    })
}

pub(super) fn seller_id_too_high(fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let resp = fx.get("1000000/item").await?;
        expect_status(&resp, &[200, 400])
    })
}

pub(super) fn unique_ids(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();
        let ads = fx
            .create_and_list(seller, &["Ad 1", "Ad 2", "Ad 3"])
            .await?;
        ensure_unique_ids(&ads)
    })
}
