//! HTTP response wrapper.

use reqwest::StatusCode;

/// A fully read text response.
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TextResponse {
    /// Check whether the body contains a markup fragment.
    pub fn contains(&self, marker: &str) -> bool {
        self.body.contains(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_marker() {
        let resp = TextResponse {
            status: StatusCode::OK,
            body: r#"<a class="topMenu__logo" href="/">"#.to_string(),
        };
        assert!(resp.contains("topMenu__logo"));
        assert!(!resp.contains("filmList"));
    }
}
