//! Upstream health probe.

use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, warn};

use super::http_client::HttpClient;
use crate::config::SiteConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok,
    Bad,
}

/// Outcome of one probe. Never an error: every failure becomes `Bad`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub message: String,
    /// False when the site could not be reached at all.
    #[serde(skip)]
    pub reachable: bool,
}

impl HealthReport {
    fn ok(message: String) -> Self {
        Self {
            status: HealthStatus::Ok,
            message,
            reachable: true,
        }
    }

    fn bad(message: String) -> Self {
        Self {
            status: HealthStatus::Bad,
            message,
            reachable: true,
        }
    }

    pub(crate) fn unreachable(message: String) -> Self {
        Self {
            status: HealthStatus::Bad,
            message,
            reachable: false,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// GET the health page and look for the structural marker.
pub async fn check(http: &HttpClient, site: &SiteConfig) -> HealthReport {
    let host = host_of(&site.health_url);

    let response = match http.get_text(&site.health_url).await {
        Ok(r) => r,
        Err(e) => {
            warn!("Error during health check: {}", e);
            return HealthReport::unreachable(format!(
                "Error occurred while checking {}: {}",
                host, e
            ));
        }
    };

    if response.status != StatusCode::OK {
        warn!("External service returned {}", response.status.as_u16());
        return HealthReport::bad(format!(
            "{} returned status {}",
            host,
            response.status.as_u16()
        ));
    }

    if response.contains(&site.health_marker) {
        info!("{} is up", host);
        HealthReport::ok(format!("{} is up and running.", host))
    } else {
        warn!("Expected marker {:?} not found on {}", site.health_marker, host);
        HealthReport::bad(format!("{} is down or its content has changed.", host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn probe(template: ResponseTemplate) -> HealthReport {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(template)
            .mount(&server)
            .await;

        let site = SiteConfig {
            health_url: format!("{}/", server.uri()),
            ..SiteConfig::default()
        };
        let http = HttpClient::new(&site, Duration::from_secs(5)).unwrap();
        check(&http, &site).await
    }

    #[tokio::test]
    async fn test_marker_present_is_ok() {
        let report = probe(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a class="topMenu__logo" href="/">Kinorium</a>"#),
        )
        .await;
        assert_eq!(report.status, HealthStatus::Ok);
        assert!(report.message.contains("up and running"));
    }

    #[tokio::test]
    async fn test_503_is_bad() {
        let report = probe(ResponseTemplate::new(503).set_body_string("topMenu__logo")).await;
        assert_eq!(report.status, HealthStatus::Bad);
        assert!(report.reachable);
        assert!(report.message.contains("503"));
    }

    #[tokio::test]
    async fn test_missing_marker_is_bad() {
        let report = probe(ResponseTemplate::new(200).set_body_string("<html>captcha</html>")).await;
        assert_eq!(report.status, HealthStatus::Bad);
        assert!(!report.message.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_is_bad() {
        let site = SiteConfig {
            health_url: "http://127.0.0.1:1/".to_string(),
            ..SiteConfig::default()
        };
        let http = HttpClient::new(&site, Duration::from_secs(2)).unwrap();
        let report = check(&http, &site).await;
        assert_eq!(report.status, HealthStatus::Bad);
        assert!(!report.reachable);
    }

    #[test]
    fn test_report_json() {
        let json = serde_json::to_value(HealthReport::ok("fine".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "OK", "message": "fine"}));
    }
}
