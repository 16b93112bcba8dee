// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::{
    catalog, catalog_with, season_fragment, season_url, test_config, FixtureSource, DETAIL_HTML,
    HOME_HTML, ORIGIN, SEARCH_NARUTO_HTML,
};
use futures::future::join_all;
use std::time::Duration;
use tokio_test::assert_ok;

#[tokio::test]
async fn test_repeated_home_within_ttl_fetches_once() {
    let source = FixtureSource::new().page(&format!("{}/", ORIGIN), HOME_HTML);
    let log = source.call_log();
    let catalog = catalog(source);

    let first = assert_ok!(catalog.home().await);
    let second = assert_ok!(catalog.home().await);
    let third = assert_ok!(catalog.home().await);

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(log.calls(), 1);
}

#[tokio::test]
async fn test_repeated_detail_skips_season_fan_out() {
    let source = FixtureSource::new()
        .page(&format!("{}/series/naruto-shippuden/", ORIGIN), DETAIL_HTML)
        .page(&season_url(1), &season_fragment(1, 3))
        .page(&season_url(2), &season_fragment(2, 3))
        .page(&season_url(3), &season_fragment(3, 3));
    let log = source.call_log();
    let catalog = catalog(source);

    let first = assert_ok!(catalog.detail("series/naruto-shippuden/").await);
    assert_eq!(log.calls(), 4);

    let second = assert_ok!(catalog.detail("series/naruto-shippuden/").await);
    assert_eq!(first, second);
    assert_eq!(log.calls(), 4);
}

#[tokio::test]
async fn test_distinct_queries_do_not_share_entries() {
    let source = FixtureSource::new()
        .page(&format!("{}/?s=naruto", ORIGIN), SEARCH_NARUTO_HTML)
        .page(
            &format!("{}/?s=Naruto", ORIGIN),
            "<ul class='post-lst'></ul>",
        );
    let log = source.call_log();
    let catalog = catalog(source);

    assert_eq!(catalog.search("naruto").await.unwrap().count, 2);
    assert_eq!(catalog.search("Naruto").await.unwrap().count, 0);
    assert_eq!(log.calls(), 2);
}

#[tokio::test]
async fn test_expired_entries_are_rebuilt() {
    let mut config = test_config();
    config.cache_ttl_secs = 1;

    let source = FixtureSource::new().page(&format!("{}/?s=naruto", ORIGIN), SEARCH_NARUTO_HTML);
    let log = source.call_log();
    let (catalog, cache) = catalog_with(source, &config);

    assert_ok!(catalog.search("naruto").await);
    assert_eq!(log.calls(), 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(cache.get("search:naruto").is_none());

    assert_ok!(catalog.search("naruto").await);
    assert_eq!(log.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_requests_see_consistent_results() {
    let source = FixtureSource::new().delayed(
        &format!("{}/?s=naruto", ORIGIN),
        SEARCH_NARUTO_HTML,
        20,
    );
    let log = source.call_log();
    let catalog = catalog(source);

    let responses = join_all((0..8).map(|_| catalog.search("naruto"))).await;
    let responses: Vec<_> = responses.into_iter().map(Result::unwrap).collect();

    assert!(responses.iter().all(|r| *r == responses[0]));
    assert!(log.calls() >= 1 && log.calls() <= 8);

    // settled: served from cache
    let before = log.calls();
    assert_ok!(catalog.search("naruto").await);
    assert_eq!(log.calls(), before);
}

#[tokio::test]
async fn test_clear_cache_drops_everything() {
    let source = FixtureSource::new()
        .page(&format!("{}/", ORIGIN), HOME_HTML)
        .page(&format!("{}/?s=naruto", ORIGIN), SEARCH_NARUTO_HTML);
    let log = source.call_log();
    let catalog = catalog(source);

    assert_ok!(catalog.home().await);
    assert_ok!(catalog.search("naruto").await);
    assert_eq!(catalog.cache_size(), 4);

    catalog.clear_cache();
    assert_eq!(catalog.cache_size(), 0);

    assert_ok!(catalog.home().await);
    assert_eq!(log.calls(), 3);
}
