//! Detail extractor: reads a loaded detail page (and its cast page) into a
//! [`MovieRecord`].
//!
//! Every field is read on its own. A locator that matches nothing leaves the
//! field empty and extraction moves on; only driver failures and timeouts
//! abort the record.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::debug;
use url::Url;

use super::browser::snapshot::resolve;
use super::browser::{Locator, SnapshotPage};
use super::selectors;
use super::session::{NavigationSession, SessionSettings, SessionState};
use crate::error::{ScrapeError, ScrapeResult};
use crate::models::{MovieRecord, Person, PlatformRating, RawMovie, RoleGroup};
use crate::utils::strip_query;

static AGE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bage_restriction_(\w+)").unwrap());

/// Age code carried in a class list such as `age_restriction age_restriction_16`.
pub fn age_code(class: &str) -> Option<String> {
    AGE_CLASS.captures(class).map(|caps| caps[1].to_string())
}

async fn text(
    session: &NavigationSession,
    locator: &Locator,
    field: &str,
) -> ScrapeResult<Option<String>> {
    let value = session
        .bounded(field, session.page().text(locator))
        .await?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if value.is_none() {
        debug!("No {} at {}", field, locator);
    }
    Ok(value)
}

async fn own_text(
    session: &NavigationSession,
    locator: &Locator,
    field: &str,
) -> ScrapeResult<Option<String>> {
    let value = session
        .bounded(field, session.page().own_text(locator))
        .await?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    if value.is_none() {
        debug!("No {} at {}", field, locator);
    }
    Ok(value)
}

async fn attribute(
    session: &NavigationSession,
    locator: &Locator,
    name: &str,
    field: &str,
) -> ScrapeResult<Option<String>> {
    let value = session
        .bounded(field, session.page().attribute(locator, name))
        .await?
        .filter(|v| !v.trim().is_empty());
    if value.is_none() {
        debug!("No {} at {}", field, locator);
    }
    Ok(value)
}

async fn count(session: &NavigationSession, locator: &Locator, field: &str) -> ScrapeResult<usize> {
    session.bounded(field, session.page().count(locator)).await
}

/// Texts of every node matching `css`.
///
/// The match count is read once and used as the iteration bound, so the page
/// must not change in between.
async fn text_list(session: &NavigationSession, css: &str, field: &str) -> ScrapeResult<Vec<String>> {
    let total = count(session, &Locator::css(css), field).await?;
    let mut values = Vec::with_capacity(total);
    for i in 0..total {
        if let Some(value) = text(session, &Locator::css(css).nth(i), field).await? {
            values.push(value);
        }
    }
    Ok(values)
}

async fn ratings(session: &NavigationSession) -> ScrapeResult<Vec<PlatformRating>> {
    let total = count(session, &Locator::css(selectors::RATING_ENTRY), "ratings").await?;
    let mut ratings = Vec::with_capacity(total);

    for i in 0..total {
        let link = Locator::css(selectors::RATING_ENTRY)
            .nth(i)
            .child(selectors::RATING_LINK)
            .first();
        let platform = own_text(session, &link, "rating platform").await?;
        let value = text(
            session,
            &link.clone().child(selectors::RATING_VALUE).first(),
            "rating value",
        )
        .await?;

        match (platform, value) {
            (Some(platform), Some(rating)) => ratings.push(PlatformRating { platform, rating }),
            _ => debug!("Skipping incomplete rating entry {}", i),
        }
    }

    Ok(ratings)
}

async fn crew(session: &NavigationSession) -> ScrapeResult<Vec<RoleGroup>> {
    let groups = count(session, &Locator::css(selectors::ROLE_GROUP), "role groups").await?;
    let mut crew = Vec::with_capacity(groups);

    for g in 0..groups {
        let group = Locator::css(selectors::ROLE_GROUP).nth(g);
        let Some(role) = text(
            session,
            &group.clone().child(selectors::ROLE_TITLE).first(),
            "role title",
        )
        .await?
        else {
            continue;
        };

        let people = count(session, &group.clone().child(selectors::PERSON), "people").await?;
        let mut members = Vec::with_capacity(people);
        for p in 0..people {
            let person = group.clone().child(selectors::PERSON).nth(p);
            let Some(name) = text(
                session,
                &person.clone().child(selectors::PERSON_NAME).first(),
                "person name",
            )
            .await?
            else {
                continue;
            };

            let image = match attribute(
                session,
                &person.clone().child(selectors::PERSON_IMAGE).first(),
                "src",
                "person image",
            )
            .await?
            {
                Some(src) => Some(src),
                None => {
                    attribute(
                        session,
                        &person.clone().child(selectors::PERSON_IMAGE_META).first(),
                        "href",
                        "person image meta",
                    )
                    .await?
                }
            };

            members.push(Person {
                name,
                image: image.map(|src| strip_query(&src)),
            });
        }

        crew.push(RoleGroup {
            role,
            people: members,
        });
    }

    Ok(crew)
}

/// Read every field of the detail page, hop to the cast page and read the
/// crew, then validate.
///
/// The session must be on a detail page. It ends on the cast page (or
/// still on the detail page when there is no cast link).
pub async fn extract_movie(session: &mut NavigationSession) -> ScrapeResult<MovieRecord> {
    if session.state() != SessionState::DetailLoaded {
        return Err(ScrapeError::Navigation(format!(
            "detail extraction needs a loaded detail page, session is {:?}",
            session.state()
        )));
    }

    let mut raw = RawMovie {
        url: session.current_url().await?,
        ..Default::default()
    };

    {
        let s = &*session;
        raw.title = text(s, &Locator::css(selectors::TITLE).first(), "title").await?;
        raw.description =
            text(s, &Locator::css(selectors::DESCRIPTION).first(), "description").await?;
        raw.year = text(s, &Locator::css(selectors::YEAR).first(), "year").await?;
        raw.duration = text(s, &selectors::duration(), "duration").await?;
        raw.budget = text(s, &Locator::css(selectors::BUDGET).first(), "budget").await?;
        raw.poster = attribute(s, &Locator::css(selectors::POSTER).first(), "src", "poster")
            .await?
            .map(|src| strip_query(&src));
        raw.age_restriction = attribute(
            s,
            &Locator::css(selectors::AGE_BADGE).first(),
            "class",
            "age restriction",
        )
        .await?
        .and_then(|class| age_code(&class));
        raw.logline = text(s, &selectors::logline(), "logline").await?;
        raw.production_companies = text_list(s, selectors::COMPANY, "companies").await?;
        raw.genres = text_list(s, selectors::GENRE, "genres").await?;
        raw.countries = text_list(s, selectors::COUNTRY, "countries").await?;
        raw.ratings = ratings(s).await?;
    }

    if session.open_crew().await? {
        raw.crew = crew(session).await?;
    }

    MovieRecord::try_from(raw)
}

/// Where the cast link of a saved detail page points, resolved against `url`.
fn saved_crew_url(url: &Url, detail_html: &str) -> ScrapeResult<Option<Url>> {
    let doc = Html::parse_document(detail_html);
    let href = resolve(&doc, &selectors::crew_link())?
        .first()
        .and_then(|el| el.value().attr("href"))
        .map(str::to_string);
    Ok(href.and_then(|h| url.join(&h).ok()))
}

/// Run the detail extractor over saved pages instead of a live browser.
///
/// `url` stands in for the address the detail page was saved from. The cast
/// page, when given, is served wherever the detail page's cast link points.
pub async fn extract_saved(
    settings: SessionSettings,
    url: &str,
    detail_html: &str,
    crew_html: Option<&str>,
) -> ScrapeResult<MovieRecord> {
    let base = Url::parse(url).map_err(|e| ScrapeError::Navigation(format!("{}: {}", url, e)))?;

    let page = SnapshotPage::new().with_page(base.as_str(), detail_html);
    if let Some(crew_html) = crew_html {
        match saved_crew_url(&base, detail_html)? {
            Some(crew_url) => page.insert(crew_url.as_str(), crew_html),
            None => debug!("Saved detail page has no cast link; cast page ignored"),
        }
    }

    let mut session = NavigationSession::with_page(Box::new(page), settings);
    let result = match session.open_detail(base.as_str()).await {
        Ok(()) => extract_movie(&mut session).await,
        Err(e) => Err(e),
    };
    let _ = session.close().await;
    result
}
