//! Web server exposing the Kinorium scraper as a JSON API.
//!
//! Routes live under `/v1/kinorium`:
//! - `GET /health` probes the upstream site
//! - `GET /movies` lists one page of a genre
//! - `GET /movie` searches a title and scrapes its detail page

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::scrapers::{KinoriumService, TransportPool};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<KinoriumService>,
    /// Browser mode used when a request does not pass `headless`.
    pub default_headless: bool,
}

impl AppState {
    pub fn new(pool: Arc<TransportPool>) -> Self {
        let default_headless = pool.config().browser.headless;
        Self {
            service: Arc::new(KinoriumService::new(pool)),
            default_headless,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

/// Start the web server and release every transport once it stops.
pub async fn serve(config: Arc<Config>, bind: &str) -> anyhow::Result<()> {
    let pool = Arc::new(TransportPool::new(config));
    pool.start().context("Failed to start HTTP transport")?;

    let app = create_router(AppState::new(pool.clone()));

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind))?;
    tracing::info!("Starting server at http://{}", addr);

    let served = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error"),
        Err(e) => Err(e).with_context(|| format!("Failed to bind {}", addr)),
    };

    pool.release_all().await;
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::scrapers::browser::snapshot::testing::SnapshotLauncher;
    use crate::scrapers::detail::tests::{CAST_HTML, CAST_URL, DETAIL_HTML, DETAIL_URL};

    const SEARCH_HIT: &str = r#"
        <div class="movieList">
          <div class="item"><a class="search-page__title-link" href="/92464/">Сталкер</a></div>
        </div>"#;

    fn search_url(title: &str) -> String {
        Url::parse_with_params("https://ua.kinorium.com/search/", &[("q", title)])
            .unwrap()
            .to_string()
    }

    fn setup_test_app(config: Config) -> (axum::Router, Arc<SnapshotLauncher>) {
        let hit = search_url("Stalker");
        let miss = search_url("Nothing");
        let launcher = Arc::new(SnapshotLauncher::with_pages(&[
            (hit.as_str(), SEARCH_HIT),
            (miss.as_str(), r#"<div class="movieList"></div>"#),
            (DETAIL_URL, DETAIL_HTML),
            (CAST_URL, CAST_HTML),
        ]));
        let pool = Arc::new(TransportPool::with_launcher(
            Arc::new(config),
            launcher.clone(),
        ));
        pool.start().unwrap();
        (create_router(AppState::new(pool)), launcher)
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_movie_record() {
        let (app, launcher) = setup_test_app(Config::default());
        let (status, json) = get(app, "/v1/kinorium/movie?title=Stalker").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["url"], DETAIL_URL);
        assert_eq!(json["title"], "Сталкер");
        assert!(json["crew"].is_array());
        assert_eq!(launcher.live_pages.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_movie_link_only() {
        let (app, _) = setup_test_app(Config::default());
        let (status, json) = get(app, "/v1/kinorium/movie?title=Stalker&scrape=false").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "url": DETAIL_URL }));
    }

    #[tokio::test]
    async fn test_movie_not_found() {
        let (app, _) = setup_test_app(Config::default());
        let (status, json) = get(app, "/v1/kinorium/movie?title=Nothing").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["detail"], "not found");
    }

    #[tokio::test]
    async fn test_movie_navigation_failure_is_502() {
        let (app, _) = setup_test_app(Config::default());
        let (status, json) = get(app, "/v1/kinorium/movie?title=Unregistered").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_movie_requires_title() {
        let (app, _) = setup_test_app(Config::default());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/kinorium/movie")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_movies_listing() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "result": {
                "html": r#"<div class="filmList__item">
                             <a class="filmList__item-title">Сталкер</a>
                             <span class="filmList__item-title-origin">Stalker, 1979</span>
                           </div>"#
            }
        });
        Mock::given(method("GET"))
            .and(path("/R2D2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.site.base_url = server.uri();
        let (app, _) = setup_test_app(config);
        let (status, json) = get(app, "/v1/kinorium/movies?genre=sci-fi&page=1&per_page=100").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["title"], "Сталкер");
        assert_eq!(json[0]["year"], "1979");
    }

    #[tokio::test]
    async fn test_movies_invalid_per_page() {
        let (app, _) = setup_test_app(Config::default());
        let (status, json) = get(app, "/v1/kinorium/movies?genre=Drama&per_page=75").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("75"));
    }

    #[tokio::test]
    async fn test_movies_unknown_genre() {
        let (app, _) = setup_test_app(Config::default());
        let (status, _) = get(app, "/v1/kinorium/movies?genre=Cartoons").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_health_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"<div class="topMenu__logo"></div>"#),
            )
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.site.health_url = format!("{}/", server.uri());
        let (app, _) = setup_test_app(config);
        let (status, json) = get(app, "/v1/kinorium/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "OK");
    }

    #[tokio::test]
    async fn test_health_bad_status_is_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.site.health_url = format!("{}/", server.uri());
        let (app, _) = setup_test_app(config);
        let (status, json) = get(app, "/v1/kinorium/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "BAD");
    }

    #[tokio::test]
    async fn test_health_unreachable_is_503() {
        let mut config = Config::default();
        config.site.health_url = "http://127.0.0.1:1/".to_string();
        let (app, _) = setup_test_app(config);
        let (status, json) = get(app, "/v1/kinorium/health").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["status"], "BAD");
        assert!(!json["message"].as_str().unwrap().is_empty());
    }
}
