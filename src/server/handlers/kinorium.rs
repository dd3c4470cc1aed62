//! Kinorium API handlers.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use super::super::AppState;
use super::helpers::{error_response, scrape_error_response};
use crate::models::{Genre, ListingQuery, PerPageLimit, QueryError};
use crate::scrapers::{DetailMode, DetailOutcome};

/// Parameters for the genre listing.
#[derive(Debug, Deserialize)]
pub struct MoviesParams {
    pub genre: String,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MoviesParams {
    fn into_query(self) -> Result<ListingQuery, QueryError> {
        let genre: Genre = self.genre.parse()?;
        let per_page = match self.per_page {
            Some(n) => PerPageLimit::try_from(n)?,
            None => PerPageLimit::default(),
        };
        ListingQuery::new(genre, self.page.unwrap_or(1), per_page)
    }
}

/// Parameters for a single-movie lookup.
#[derive(Debug, Deserialize)]
pub struct MovieParams {
    pub title: String,
    pub headless: Option<bool>,
    /// `false` stops at the detail page and returns its URL.
    pub scrape: Option<bool>,
}

/// Upstream health. A network failure is reported as 503, anything else as 200.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.service.health_check().await;
    let status = if report.reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, axum::Json(report)).into_response()
}

/// One page of movies for a genre.
pub async fn list_movies(
    State(state): State<AppState>,
    params: Result<Query<MoviesParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.body_text()),
    };
    let query = match params.into_query() {
        Ok(q) => q,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    match state.service.list_movies(&query).await {
        Ok(records) => axum::Json(records).into_response(),
        Err(e) => scrape_error_response(e),
    }
}

/// Search a movie by title and scrape its detail page.
pub async fn movie_detail(
    State(state): State<AppState>,
    params: Result<Query<MovieParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e.body_text()),
    };
    let title = params.title.trim();
    if title.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty");
    }

    let mode = if params.scrape.unwrap_or(true) {
        DetailMode::Scrape
    } else {
        DetailMode::LinkOnly
    };
    let headless = params.headless.unwrap_or(state.default_headless);

    match state.service.movie_detail(title, mode, headless).await {
        Ok(DetailOutcome::Record(record)) => axum::Json(record).into_response(),
        Ok(DetailOutcome::Link(url)) => axum::Json(serde_json::json!({ "url": url })).into_response(),
        Ok(DetailOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({ "detail": "not found" })),
        )
            .into_response(),
        Err(e) => scrape_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(genre: &str, page: Option<u32>, per_page: Option<u32>) -> MoviesParams {
        MoviesParams {
            genre: genre.to_string(),
            page,
            per_page,
        }
    }

    #[test]
    fn test_movies_params_defaults() {
        let query = params("drama", None, None).into_query().unwrap();
        assert_eq!(query.genre, Genre::Drama);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, PerPageLimit::Small);
    }

    #[test]
    fn test_movies_params_rejects_bad_input() {
        assert!(matches!(
            params("Cartoons", None, None).into_query(),
            Err(QueryError::UnknownGenre(_))
        ));
        assert_eq!(
            params("Drama", None, Some(75)).into_query(),
            Err(QueryError::InvalidPerPage(75))
        );
        assert_eq!(
            params("Drama", Some(0), None).into_query(),
            Err(QueryError::InvalidPage)
        );
    }
}
