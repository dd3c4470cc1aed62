//! End-to-end checks through the public API: the HTTP listing path and the
//! router, against a mock upstream.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kinoscrape::config::Config;
use kinoscrape::models::{Genre, ListingQuery, PerPageLimit};
use kinoscrape::scrapers::detail::extract_saved;
use kinoscrape::scrapers::{KinoriumService, SessionSettings, TransportPool};
use kinoscrape::server::{create_router, AppState};

const FRAGMENT: &str = r#"
<div class="filmList__item">
  <div class="filmList__item-poster"><img data-src="https://img.test/a.jpg?size=s"></div>
  <a class="filmList__item-title">Сталкер</a>
  <span class="filmList__item-title-origin">Stalker, 1979</span>
  <span class="filmList__extra-info">фантастика, драма, 2 год 41 хв</span>
</div>
<div class="filmList__item">
  <a class="filmList__item-title">Соляріс</a>
</div>"#;

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/R2D2/"))
        .and(query_param("genres[]", "29"))
        .and(query_param("perpage", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "result": { "html": FRAGMENT } })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<header><a class="topMenu__logo" href="/">Kinorium</a></header>"#,
        ))
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer) -> Arc<Config> {
    let mut config = Config::default();
    config.site.base_url = server.uri();
    config.site.health_url = format!("{}/", server.uri());
    Arc::new(config)
}

#[tokio::test]
async fn listing_over_http() {
    let server = upstream().await;
    let pool = Arc::new(TransportPool::new(config_for(&server)));
    pool.start().unwrap();
    let service = KinoriumService::new(pool.clone());

    let query = ListingQuery::new(Genre::SciFi, 1, PerPageLimit::Medium).unwrap();
    let records = service.list_movies(&query).await.unwrap();
    pool.release_all().await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "Сталкер");
    assert_eq!(records[0].original_title.as_deref(), Some("Stalker"));
    assert_eq!(records[0].year.as_deref(), Some("1979"));
    assert_eq!(records[0].genres, vec!["фантастика", "драма"]);
    assert_eq!(records[0].duration.as_deref(), Some("2 год 41 хв"));
    assert_eq!(records[0].poster.as_deref(), Some("https://img.test/a.jpg"));
    assert_eq!(records[1].original_title, None);
}

#[tokio::test]
async fn router_serves_listing_and_health() {
    let server = upstream().await;
    let pool = Arc::new(TransportPool::new(config_for(&server)));
    pool.start().unwrap();
    let app = create_router(AppState::new(pool.clone()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/kinorium/movies?genre=Sci-Fi&per_page=100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/kinorium/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "OK");

    pool.release_all().await;
    assert!(!pool.has_browser(true));
}

#[tokio::test]
async fn saved_detail_page() {
    let detail = r#"
      <h1 class="film-page__title-text">Соляріс</h1>
      <div class="film-page__date"><a>1972</a></div>
      <a class="film-page__tab-link" href="/solaris/cast/">Актори</a>"#;
    let cast = r#"
      <section class="cast-page__item-group">
        <h2 class="cast-page__title">Режисер</h2>
        <div class="cast-page__item"><a class="cast-page__link-name">Андрій Тарковський</a></div>
      </section>"#;

    let settings = SessionSettings {
        search_url: "https://ua.kinorium.com/search/".to_string(),
        wait_timeout: Duration::from_secs(5),
        observation_delay: Duration::ZERO,
        headless: true,
    };
    let record = extract_saved(settings, "https://ua.kinorium.com/solaris/", detail, Some(cast))
        .await
        .unwrap();

    assert_eq!(record.title(), Some("Соляріс"));
    assert_eq!(record.year(), Some(1972));
    assert_eq!(record.age_restriction(), "unknown");
    assert_eq!(record.crew()[0].role, "Режисер");
}
