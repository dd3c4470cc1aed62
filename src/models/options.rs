//! Listing query options: genres, page sizes and the query they build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid listing query input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown genre '{0}'")]
    UnknownGenre(String),

    #[error("Invalid per_page {0}. Valid options: 50, 100, 200")]
    InvalidPerPage(u32),

    #[error("Page must be 1 or greater")]
    InvalidPage,
}

macro_rules! genres {
    ($($variant:ident => ($name:literal, $id:literal)),+ $(,)?) => {
        /// Movie genres known to the site's listing filter.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Genre {
            $($variant),+
        }

        impl Genre {
            const ALL: &'static [Genre] = &[$(Genre::$variant),+];

            /// Display name used by the API.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Genre::$variant => $name),+
                }
            }

            /// Site-internal id used by the `genres[]` filter.
            pub fn id(&self) -> u32 {
                match self {
                    $(Genre::$variant => $id),+
                }
            }
        }
    };
}

genres! {
    Anime => ("Anime", 1),
    Biography => ("Biography", 2),
    Action => ("Action", 3),
    Western => ("Western", 4),
    War => ("War", 5),
    Mystery => ("Mystery", 6),
    Documentary => ("Documentary", 9),
    Drama => ("Drama", 10),
    GameShow => ("Game Show", 11),
    History => ("History", 12),
    Comedy => ("Comedy", 13),
    Concert => ("Concert", 14),
    Short => ("Short", 15),
    Crime => ("Crime", 16),
    Romance => ("Romance", 17),
    Music => ("Music", 18),
    Animation => ("Animation", 19),
    Musical => ("Musical", 20),
    News => ("News", 21),
    Adventure => ("Adventure", 22),
    RealityTv => ("Reality TV", 23),
    Family => ("Family", 24),
    Sport => ("Sport", 25),
    TalkShow => ("Talk Show", 26),
    Thriller => ("Thriller", 27),
    Horror => ("Horror", 28),
    SciFi => ("Sci-Fi", 29),
    FilmNoir => ("Film Noir", 30),
    Fantasy => ("Fantasy", 31),
    Award => ("Award", 32),
}

impl Genre {
    /// All genres in id order.
    pub fn all() -> &'static [Genre] {
        Self::ALL
    }
}

/// Lowercase and drop separators so "Sci-Fi", "sci_fi" and "SCIFI" compare equal.
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for Genre {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Self::ALL
            .iter()
            .copied()
            .find(|g| normalize_key(g.name()) == key)
            .ok_or_else(|| QueryError::UnknownGenre(s.to_string()))
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Genre {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Genre {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Allowed values for the listing page size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PerPageLimit {
    #[default]
    Small,
    Medium,
    Large,
}

impl PerPageLimit {
    pub fn value(&self) -> u32 {
        match self {
            Self::Small => 50,
            Self::Medium => 100,
            Self::Large => 200,
        }
    }
}

impl TryFrom<u32> for PerPageLimit {
    type Error = QueryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            50 => Ok(Self::Small),
            100 => Ok(Self::Medium),
            200 => Ok(Self::Large),
            other => Err(QueryError::InvalidPerPage(other)),
        }
    }
}

/// Fixed parameters the listing endpoint expects alongside the paging ones.
const LISTING_TYPE: &str = "movie";
const LISTING_ORDER: &str = "rating";

/// A validated request for one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingQuery {
    pub genre: Genre,
    pub page: u32,
    pub per_page: PerPageLimit,
}

impl ListingQuery {
    /// Build a query, rejecting page numbers below 1.
    pub fn new(genre: Genre, page: u32, per_page: PerPageLimit) -> Result<Self, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidPage);
        }
        Ok(Self {
            genre,
            page,
            per_page,
        })
    }

    /// Query parameters for the listing endpoint.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("type", LISTING_TYPE.to_string()),
            ("order", LISTING_ORDER.to_string()),
            ("page", self.page.to_string()),
            ("perpage", self.per_page.value().to_string()),
            ("genres[]", self.genre.id().to_string()),
            ("list_only", "1".to_string()),
            ("ajax", "1".to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_ids() {
        assert_eq!(Genre::Anime.id(), 1);
        assert_eq!(Genre::Documentary.id(), 9);
        assert_eq!(Genre::Fantasy.id(), 31);
        assert_eq!(Genre::Award.id(), 32);
        assert_eq!(Genre::all().len(), 30);
    }

    #[test]
    fn test_genre_from_str_variants() {
        assert_eq!("Sci-Fi".parse::<Genre>(), Ok(Genre::SciFi));
        assert_eq!("sci_fi".parse::<Genre>(), Ok(Genre::SciFi));
        assert_eq!("reality tv".parse::<Genre>(), Ok(Genre::RealityTv));
        assert_eq!("DRAMA".parse::<Genre>(), Ok(Genre::Drama));
    }

    #[test]
    fn test_unknown_genre_is_rejected() {
        assert_eq!(
            "Telenovela".parse::<Genre>(),
            Err(QueryError::UnknownGenre("Telenovela".to_string()))
        );
    }

    #[test]
    fn test_genre_serde_uses_display_name() {
        assert_eq!(serde_json::to_string(&Genre::FilmNoir).unwrap(), "\"Film Noir\"");
        let g: Genre = serde_json::from_str("\"film-noir\"").unwrap();
        assert_eq!(g, Genre::FilmNoir);
    }

    #[test]
    fn test_per_page_limits() {
        assert_eq!(PerPageLimit::try_from(100), Ok(PerPageLimit::Medium));
        assert_eq!(PerPageLimit::try_from(75), Err(QueryError::InvalidPerPage(75)));
        assert_eq!(PerPageLimit::default().value(), 50);
    }

    #[test]
    fn test_query_rejects_page_zero() {
        assert_eq!(
            ListingQuery::new(Genre::Drama, 0, PerPageLimit::Small),
            Err(QueryError::InvalidPage)
        );
    }

    #[test]
    fn test_query_params() {
        let query = ListingQuery::new(Genre::Comedy, 3, PerPageLimit::Large).unwrap();
        let params = query.params();
        assert!(params.contains(&("genres[]", "13".to_string())));
        assert!(params.contains(&("page", "3".to_string())));
        assert!(params.contains(&("perpage", "200".to_string())));
        assert!(params.contains(&("list_only", "1".to_string())));
        assert!(params.contains(&("ajax", "1".to_string())));
        assert!(params.iter().any(|(k, _)| *k == "type"));
        assert!(params.iter().any(|(k, _)| *k == "order"));
    }
}
