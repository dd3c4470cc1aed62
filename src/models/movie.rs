//! Full movie record assembled from the detail and cast pages.

use serde::Serialize;

use crate::error::ScrapeError;
use crate::utils::{collapse_whitespace, non_empty, strip_quote_glyphs};

/// Age restriction value used when the page carries no rating badge.
pub const AGE_UNKNOWN: &str = "unknown";

/// Rating reported by one platform (the site itself, IMDb, critics...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformRating {
    pub platform: String,
    pub rating: String,
}

/// A credited person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Crew members sharing one credited role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleGroup {
    pub role: String,
    pub people: Vec<Person>,
}

/// Field values as collected from the page, before validation.
///
/// Every field is independent: a missing node leaves its slot `None` or
/// empty without affecting the others.
#[derive(Debug, Clone, Default)]
pub struct RawMovie {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub year: Option<String>,
    pub countries: Vec<String>,
    pub duration: Option<String>,
    pub budget: Option<String>,
    pub poster: Option<String>,
    pub age_restriction: Option<String>,
    pub logline: Option<String>,
    pub production_companies: Vec<String>,
    pub genres: Vec<String>,
    pub ratings: Vec<PlatformRating>,
    pub crew: Vec<RoleGroup>,
}

/// A validated movie record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieRecord {
    url: String,
    title: Option<String>,
    description: Option<String>,
    year: Option<i32>,
    countries: Vec<String>,
    duration: Option<String>,
    budget: Option<String>,
    poster: Option<String>,
    age_restriction: String,
    logline: Option<String>,
    production_companies: Vec<String>,
    genres: Vec<String>,
    ratings: Vec<PlatformRating>,
    crew: Vec<RoleGroup>,
}

impl TryFrom<RawMovie> for MovieRecord {
    type Error = ScrapeError;

    fn try_from(raw: RawMovie) -> Result<Self, Self::Error> {
        let url = non_empty(raw.url)
            .ok_or_else(|| ScrapeError::Validation("missing page url".to_string()))?;

        let year = match non_empty(raw.year) {
            Some(text) => Some(text.parse::<i32>().map_err(|_| {
                ScrapeError::Validation(format!("year is not numeric: {:?}", text))
            })?),
            None => None,
        };

        let crew = raw
            .crew
            .into_iter()
            .map(|group| RoleGroup {
                role: collapse_whitespace(&group.role),
                people: group
                    .people
                    .into_iter()
                    .filter_map(|p| {
                        let name = p.name.trim().to_string();
                        (!name.is_empty()).then_some(Person {
                            name,
                            image: non_empty(p.image),
                        })
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            url,
            title: non_empty(raw.title),
            description: non_empty(raw.description),
            year,
            countries: clean_names(raw.countries),
            duration: non_empty(raw.duration).map(|d| collapse_whitespace(&d)),
            budget: non_empty(raw.budget).map(|b| collapse_whitespace(&b)),
            poster: non_empty(raw.poster),
            age_restriction: non_empty(raw.age_restriction)
                .unwrap_or_else(|| AGE_UNKNOWN.to_string()),
            logline: non_empty(raw.logline.map(|l| strip_quote_glyphs(&l))),
            production_companies: clean_names(raw.production_companies),
            genres: clean_names(raw.genres),
            ratings: raw
                .ratings
                .into_iter()
                .map(|r| PlatformRating {
                    platform: collapse_whitespace(&r.platform),
                    rating: r.rating.trim().to_string(),
                })
                .collect(),
            crew,
        })
    }
}

/// Trim every name and drop blanks, keeping order.
fn clean_names(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

impl MovieRecord {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    pub fn budget(&self) -> Option<&str> {
        self.budget.as_deref()
    }

    pub fn poster(&self) -> Option<&str> {
        self.poster.as_deref()
    }

    pub fn age_restriction(&self) -> &str {
        &self.age_restriction
    }

    pub fn logline(&self) -> Option<&str> {
        self.logline.as_deref()
    }

    pub fn production_companies(&self) -> &[String] {
        &self.production_companies
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn ratings(&self) -> &[PlatformRating] {
        &self.ratings
    }

    pub fn crew(&self) -> &[RoleGroup] {
        &self.crew
    }
}
