//! Content prober and extractor tests against a local HTTP server

use axum::{http::StatusCode, response::Html, response::Redirect, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use websafe_core::Feature;
use websafe_features::{
    probe_content, probe_redirects, ContentProber, FeatureExtractor, HashedDomainAge, HttpProber,
    PageSignals, ProbeConfig,
};

const LOGIN_PAGE: &str = r#"<html><body>
<form action="/session"><input type="email" name="user"><input type="password" name="pass"></form>
<iframe src="https://tracker.example/frame"></iframe>
</body></html>"#;

async fn spawn_site() -> SocketAddr {
    let app = Router::new()
        .route("/login", get(|| async { Html(LOGIN_PAGE) }))
        .route("/plain", get(|| async { Html("<p>nothing to see</p>") }))
        .route("/hop1", get(|| async { Redirect::temporary("/hop2") }))
        .route("/hop2", get(|| async { Redirect::temporary("/login") }))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route(
            "/gone",
            get(|| async { (StatusCode::NOT_FOUND, Html(LOGIN_PAGE)) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html(LOGIN_PAGE)
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Prober that ignores any proxy settings in the environment
fn local_prober(config: ProbeConfig) -> HttpProber {
    let redirect_client = HttpProber::client_builder(&config)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let content_client = HttpProber::client_builder(&config)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
        .build()
        .unwrap();

    HttpProber::with_clients(redirect_client, content_client, config).unwrap()
}

#[tokio::test]
async fn test_counts_redirect_hops() {
    let addr = spawn_site().await;
    let prober = local_prober(ProbeConfig::default());

    let hops = prober.count_redirects(&format!("http://{}/hop1", addr)).await.unwrap();
    assert_eq!(hops, 2);

    let hops = prober.count_redirects(&format!("http://{}/plain", addr)).await.unwrap();
    assert_eq!(hops, 0);
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let addr = spawn_site().await;
    let prober = local_prober(ProbeConfig {
        max_redirects: 3,
        ..Default::default()
    });

    let url = format!("http://{}/loop", addr);
    assert!(prober.count_redirects(&url).await.is_err());
    assert_eq!(probe_redirects(&prober, &url).await, 0);
}

#[tokio::test]
async fn test_redirect_chain_at_limit_is_counted() {
    let addr = spawn_site().await;
    let prober = local_prober(ProbeConfig {
        max_redirects: 2,
        ..Default::default()
    });

    let hops = prober.count_redirects(&format!("http://{}/hop1", addr)).await.unwrap();
    assert_eq!(hops, 2);
}

#[tokio::test]
async fn test_page_signals_from_markup() {
    let addr = spawn_site().await;
    let prober = local_prober(ProbeConfig::default());

    let signals = prober
        .fetch_page_signals(&format!("http://{}/login", addr))
        .await
        .unwrap();
    assert_eq!(
        signals,
        PageSignals {
            has_login_form: true,
            has_iframe: true
        }
    );

    let signals = prober
        .fetch_page_signals(&format!("http://{}/plain", addr))
        .await
        .unwrap();
    assert_eq!(signals, PageSignals::default());
}

#[tokio::test]
async fn test_error_status_degrades_to_neutral() {
    let addr = spawn_site().await;
    let prober = local_prober(ProbeConfig::default());
    let url = format!("http://{}/gone", addr);

    assert!(prober.fetch_page_signals(&url).await.is_err());
    assert_eq!(probe_content(&prober, &url).await, PageSignals::default());
}

#[tokio::test]
async fn test_timeout_degrades_to_neutral() {
    let addr = spawn_site().await;
    let prober = local_prober(ProbeConfig {
        timeout_ms: 200,
        ..Default::default()
    });
    let url = format!("http://{}/slow", addr);

    assert!(prober.fetch_page_signals(&url).await.is_err());
    assert!(prober.count_redirects(&url).await.is_err());
    assert_eq!(probe_redirects(&prober, &url).await, 0);
}

#[tokio::test]
async fn test_unreachable_host_yields_complete_vector() {
    let prober = local_prober(ProbeConfig {
        timeout_ms: 1_000,
        ..Default::default()
    });
    let extractor = FeatureExtractor::new(Arc::new(prober), Arc::new(HashedDomainAge)).unwrap();

    // Port 1 on loopback refuses connections
    let features = extractor.extract("http://127.0.0.1:1/login").await;

    assert_eq!(features.len(), 11);
    assert_eq!(features.get(Feature::RedirectCount), 0);
    assert_eq!(features.get(Feature::HasLoginForm), 0);
    assert_eq!(features.get(Feature::HasIframe), 0);
    assert_eq!(features.get(Feature::HasIpAddress), 1);
    assert_eq!(features.get(Feature::SuspiciousWordsCount), 1);
}

#[tokio::test]
async fn test_extract_combines_network_signals() {
    let addr = spawn_site().await;
    let extractor = FeatureExtractor::new(
        Arc::new(local_prober(ProbeConfig::default())),
        Arc::new(HashedDomainAge),
    )
    .unwrap();

    let features = extractor.extract(&format!("http://{}/hop1", addr)).await;

    assert_eq!(features.get(Feature::RedirectCount), 2);
    assert_eq!(features.get(Feature::HasLoginForm), 1);
    assert_eq!(features.get(Feature::HasIframe), 1);
    assert_eq!(features.get(Feature::IsHttps), 0);
}
