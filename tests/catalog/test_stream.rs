// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::common::{catalog, catalog_with, test_config, FixtureSource, ORIGIN};
use anime_relay::catalog::CatalogError;
use anime_relay::extract::UrlScanner;
use anime_relay::fetch::CallClass;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use url::Url;

const EPISODE_PAGE: &str = r#"
<html><head>
  <link rel="stylesheet" href="https://site.test/theme.css">
  <script src="/wp-includes/js/player.js?ver=2"></script>
  <script src="https://cdn.test/broken.js"></script>
</head><body>
  <iframe src="//embed.test/v/abc"></iframe>
  <script>
    var sources = ["https://cdn.test/hls/master.m3u8", "https://cdn.test/poster.jpg"];
    var backup = "/media/naruto-1x1.mp4";
  </script>
</body></html>
"#;

const PLAYER_JS: &str = r#"
  jwplayer().setup({ file: "https://cdn.test/hls/alt.m3u8?token=1" });
  var mirror = 'https://mirror.test/naruto-1x1.webm';
  var logo = "https://cdn.test/logo.png";
"#;

fn episode_url() -> String {
    format!("{}/episode/naruto-1x1", ORIGIN)
}

#[tokio::test]
async fn test_stream_merges_page_and_scripts() {
    let source = FixtureSource::new()
        .page(&episode_url(), EPISODE_PAGE)
        .page(&format!("{}/wp-includes/js/player.js?ver=2", ORIGIN), PLAYER_JS)
        .failing("https://cdn.test/broken.js", 404);
    let catalog = catalog(source);

    let result = catalog.stream("naruto-1x1").await.unwrap();

    assert_eq!(result.requested_path, "naruto-1x1");
    assert_eq!(
        result.m3u8_links.iter().collect::<Vec<_>>(),
        vec![
            "https://cdn.test/hls/alt.m3u8?token=1",
            "https://cdn.test/hls/master.m3u8",
        ]
    );
    assert_eq!(
        result.video_links.iter().collect::<Vec<_>>(),
        vec![
            "https://mirror.test/naruto-1x1.webm",
            "https://site.test/media/naruto-1x1.mp4",
        ]
    );
    assert_eq!(
        result.iframes.iter().collect::<Vec<_>>(),
        vec!["https://embed.test/v/abc"]
    );
    assert_eq!(result.total_streams, 5);

    let all: Vec<_> = result
        .m3u8_links
        .iter()
        .chain(&result.video_links)
        .chain(&result.iframes)
        .collect();
    assert!(all.iter().all(|u| u.starts_with("https://")));
    assert!(!all.iter().any(|u| u.ends_with(".css") || u.ends_with(".png") || u.ends_with(".jpg")));
}

#[tokio::test]
async fn test_stream_movie_path_is_kept() {
    let source = FixtureSource::new().page(
        &format!("{}/movies/your-name", ORIGIN),
        r#"<video src="https://cdn.test/your-name.mp4"></video>"#,
    );
    let log = source.call_log();
    let catalog = catalog(source);

    let result = catalog.stream("movies/your-name").await.unwrap();
    assert_eq!(result.requested_path, "movies/your-name");
    assert_eq!(result.video_links.len(), 1);
    assert_eq!(
        log.requested(),
        vec![(format!("{}/movies/your-name", ORIGIN), CallClass::Page)]
    );
}

#[tokio::test]
async fn test_stream_scans_at_most_configured_scripts() {
    let mut config = test_config();
    config.max_script_scans = 2;

    let scripts: String = (1..=4)
        .map(|n| format!(r#"<script src="/s{}.js"></script>"#, n))
        .collect();
    let mut source = FixtureSource::new().page(&episode_url(), &scripts);
    for n in 1..=4 {
        source = source.page(
            &format!("{}/s{}.js", ORIGIN, n),
            &format!("'https://cdn.test/{}.m3u8'", n),
        );
    }
    let log = source.call_log();
    let (catalog, _) = catalog_with(source, &config);

    let result = catalog.stream("naruto-1x1").await.unwrap();

    assert_eq!(
        result.m3u8_links.iter().collect::<Vec<_>>(),
        vec!["https://cdn.test/1.m3u8", "https://cdn.test/2.m3u8"]
    );
    let script_calls = log
        .requested()
        .iter()
        .filter(|(_, class)| *class == CallClass::Script)
        .count();
    assert_eq!(script_calls, 2);
    assert_eq!(log.sessions(), 2);
}

#[tokio::test]
async fn test_stream_page_is_never_served_from_page_cache() {
    let source = FixtureSource::new().page(&episode_url(), "<p>no player yet</p>");
    let log = source.call_log();
    let (catalog, cache) = catalog_with(source, &test_config());

    let result = catalog.stream("naruto-1x1").await.unwrap();
    assert_eq!(result.total_streams, 0);
    assert!(cache.get(&format!("page:{}", episode_url())).is_none());
    assert!(cache.get("stream:naruto-1x1").is_some());

    catalog.clear_cache();
    catalog.stream("naruto-1x1").await.unwrap();
    assert_eq!(log.calls_to(&episode_url()), 2);
}

#[tokio::test]
async fn test_stream_page_timeout_surfaces() {
    let source = FixtureSource::new().timing_out(&episode_url());
    let catalog = catalog(source);

    let result = catalog.stream("naruto-1x1").await;
    match result {
        Err(CatalogError::Network(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_failed_scripts_do_not_fail_lookup() {
    let source = FixtureSource::new()
        .page(
            &episode_url(),
            r#"<script src="/a.js"></script><script src="/b.js"></script>
               <script>var f = "https://cdn.test/ok.m3u8";</script>"#,
        )
        .failing(&format!("{}/a.js", ORIGIN), 500)
        .timing_out(&format!("{}/b.js", ORIGIN));
    let catalog = catalog(source);

    let result = catalog.stream("naruto-1x1").await.unwrap();
    assert_eq!(result.total_streams, 1);
    assert!(result.m3u8_links.contains("https://cdn.test/ok.m3u8"));
}

#[tokio::test]
async fn test_stream_script_matches_resolve_against_script_host() {
    let source = FixtureSource::new()
        .page(
            &episode_url(),
            r#"<script src="https://cdn.test/player/app.js"></script>"#,
        )
        .page(
            "https://cdn.test/player/app.js",
            r#"player.load("/hls/ep1.m3u8"); var alt = "/media/ep1.mp4";"#,
        );
    let catalog = catalog(source);

    let result = catalog.stream("naruto-1x1").await.unwrap();

    assert_eq!(
        result.m3u8_links.iter().collect::<Vec<_>>(),
        vec!["https://cdn.test/hls/ep1.m3u8"]
    );
    assert_eq!(
        result.video_links.iter().collect::<Vec<_>>(),
        vec!["https://cdn.test/media/ep1.mp4"]
    );
}

/// Reports one fixed URL per scanned text and remembers every base it saw
#[derive(Default)]
struct RecordingScanner {
    bases: Mutex<Vec<String>>,
}

impl UrlScanner for RecordingScanner {
    fn scan(&self, _text: &str, base: &Url) -> BTreeSet<String> {
        self.bases.lock().unwrap().push(base.to_string());
        let mut found = BTreeSet::new();
        found.insert(base.join("stub.m3u8").unwrap().to_string());
        found
    }
}

#[tokio::test]
async fn test_stream_uses_injected_scanner() {
    let source = FixtureSource::new()
        .page(
            &episode_url(),
            r#"<script src="/js/player.js"></script>
               <script>var f = "https://cdn.test/ignored.m3u8";</script>"#,
        )
        .page(&format!("{}/js/player.js", ORIGIN), "");
    let scanner = Arc::new(RecordingScanner::default());
    let catalog = catalog(source).with_scanner(scanner.clone());

    let result = catalog.stream("naruto-1x1").await.unwrap();

    assert_eq!(
        result.m3u8_links.iter().collect::<Vec<_>>(),
        vec![
            "https://site.test/episode/stub.m3u8",
            "https://site.test/js/stub.m3u8",
        ]
    );
    let mut bases = scanner.bases.lock().unwrap().clone();
    bases.sort();
    assert_eq!(
        bases,
        vec![episode_url(), format!("{}/js/player.js", ORIGIN)]
    );
}

#[tokio::test]
async fn test_stream_placeholder_frames_are_not_counted() {
    let source = FixtureSource::new().page(
        &episode_url(),
        r#"<iframe src="about:blank"></iframe>
           <iframe src="javascript:false"></iframe>
           <iframe src="https://embed.test/v/1"></iframe>"#,
    );
    let catalog = catalog(source);

    let result = catalog.stream("naruto-1x1").await.unwrap();

    assert_eq!(
        result.iframes.iter().collect::<Vec<_>>(),
        vec!["https://embed.test/v/1"]
    );
    assert_eq!(result.total_streams, 1);
}
