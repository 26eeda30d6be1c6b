use super::{
    ensure, ensure_owned_by, ensure_unique_ids, expect_array, expect_status, seller_of, CaseFuture,
    Fixture,
};

pub(super) fn full_cycle(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();

        // 1. create
        fx.create_ad(seller, "Integration Test Ad").await?;

        // 2. seller listing
        let seller_ads = fx
            .client
            .wait_for_seller_ads(seller, 1)
            .await?
            .into_value()
            .unwrap_or_default();
        let ad = seller_ads
            .first()
            .ok_or_else(|| crate::AdprobeError::Check("seller has no ads".into()))?;

        // 3. by id
        let resp = fx.get(&format!("item/{}", ad.id)).await?;
        expect_status(&resp, &[200])?;
        let items = expect_array(&resp)?;
        let item = items
            .first()
            .ok_or_else(|| crate::AdprobeError::Check("item response is an empty array".into()))?;
        ensure(
            item.get("id").and_then(|v| v.as_str()) == Some(ad.id.as_str()),
            format!("item response id does not match {}", ad.id),
        )?;
        ensure(
            seller_of(item) == Some(seller.get()),
            format!("item seller {:?} does not match {}", seller_of(item), seller),
        )?;

        // 4. statistics
        let stats = fx.get(&format!("statistic/{}", ad.id)).await?;
        expect_status(&stats, &[200])?;

        // 5. listing contains the ad
        ensure(
            seller_ads.iter().any(|a| a.id == ad.id),
            format!("ad {} missing from seller listing", ad.id),
        )
    })
}

pub(super) fn several_ads_one_seller(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();
        let ads = fx
            .create_and_list(seller, &["Ad 1", "Ad 2", "Ad 3"])
            .await?;

        ensure(
            ads.len() >= 3,
            format!("expected at least 3 ads, got {}", ads.len()),
        )?;
        ensure_unique_ids(&ads)?;
        ensure_owned_by(&ads, seller)
    })
}

pub(super) fn distinct_ids(mut fx: Fixture) -> CaseFuture {
    Box::pin(async move {
        let seller = fx.fresh_seller();
        let names = ["Ad 1", "Ad 2", "Ad 3", "Ad 4", "Ad 5"];
        let ads = fx.create_and_list(seller, &names).await?;
        ensure_unique_ids(&ads)?;

        // Item ids echoed in the create responses must be distinct too.
        let mut echoed: Vec<&str> = fx
            .created()
            .iter()
            .filter_map(|c| c.item_id.as_deref())
            .collect();
        let total = echoed.len();
        echoed.sort_unstable();
        echoed.dedup();
        ensure(
            echoed.len() == total,
            "create responses echoed duplicate item ids",
        )
    })
}
