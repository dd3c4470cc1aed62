//! HTTP request handlers for the web server.

mod helpers;
mod kinorium;

pub use kinorium::{health, list_movies, movie_detail};
