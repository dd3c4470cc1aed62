//! CSS selectors for the site's markup.
//!
//! All knowledge of the page structure lives here so a markup change is a
//! one-file fix.

use super::browser::Locator;

// Search page
pub const SEARCH_RESULT: &str = ".movieList .item";
pub const SEARCH_RESULT_LINK: &str = ".search-page__title-link";

/// First entry of the search results.
pub fn first_result() -> Locator {
    Locator::css(SEARCH_RESULT).first()
}

pub fn first_result_link() -> Locator {
    first_result().child(SEARCH_RESULT_LINK).first()
}

// Detail page
pub const TITLE: &str = "h1.film-page__title-text";
pub const DESCRIPTION: &str = ".film-page__text section.text";
pub const YEAR: &str = ".film-page__date a";
pub const INFO_ROW: &str = ".infotable tr";
pub const INFO_VALUE: &str = "td.data";
/// Row of the info table holding the localized running time.
pub const DURATION_ROW: usize = 2;
pub const BUDGET: &str = ".box_budget .value";
pub const POSTER: &str = ".movie_gallery_item.poster img";
pub const AGE_BADGE: &str = ".film-page__title-elements .age_restriction";
pub const SLOGAN: &str = ".film-page__slogan";
/// The first slogan node is the section caption; the logline is the second.
pub const LOGLINE_INDEX: usize = 1;
pub const COMPANY: &str = ".film-page__company-list .film-page__company";
pub const GENRE: &str = ".infotable [itemprop=\"genre\"]";
pub const COUNTRY: &str = ".film-page__country-link";
pub const RATING_ENTRY: &str = ".ratingsBlock .ratingsBlock__item";
pub const RATING_LINK: &str = "a";
pub const RATING_VALUE: &str = ".value";
pub const CREW_LINK: &str = "a.film-page__tab-link[href$=\"/cast/\"]";

pub fn duration() -> Locator {
    Locator::css(INFO_ROW).nth(DURATION_ROW).child(INFO_VALUE)
}

pub fn logline() -> Locator {
    Locator::css(SLOGAN).nth(LOGLINE_INDEX)
}

pub fn crew_link() -> Locator {
    Locator::css(CREW_LINK).first()
}

// Cast page
pub const ROLE_GROUP: &str = ".cast-page__item-group";
pub const ROLE_TITLE: &str = ".cast-page__title";
pub const PERSON: &str = ".cast-page__item";
pub const PERSON_NAME: &str = ".cast-page__link-name";
pub const PERSON_IMAGE: &str = ".cast-page__image img";
pub const PERSON_IMAGE_META: &str = "link[itemprop=\"image\"]";

// Listing fragment
pub const LISTING_ENTRY: &str = ".filmList__item";
pub const LISTING_TITLE: &str = ".filmList__item-title";
pub const LISTING_ORIGINAL: &str = ".filmList__item-title-origin";
pub const LISTING_GENRES: &str = ".filmList__extra-info";
pub const LISTING_POSTER: &str = ".filmList__item-poster img";
