//! User agent shared by the HTTP client and every browsing context, so the
//! listing requests and the browser walk present as the same visitor.

/// Sent when nothing is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("kinoscrape/", env!("CARGO_PKG_VERSION"));

const CHROME_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
const CHROME_MACOS: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Desktop Chrome on the host platform, matching the browser we launch.
fn host_chrome() -> &'static str {
    match std::env::consts::OS {
        "macos" => CHROME_MACOS,
        "windows" => CHROME_WINDOWS,
        _ => CHROME_LINUX,
    }
}

/// Resolve the configured user agent.
/// - unset or blank => [`DEFAULT_USER_AGENT`]
/// - "impersonate" => desktop Chrome for the host platform
/// - other => used as-is
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config.map(str::trim) {
        None | Some("") => DEFAULT_USER_AGENT.to_string(),
        Some(v) if v.eq_ignore_ascii_case("impersonate") => host_chrome().to_string(),
        Some(custom) => custom.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user_agent() {
        assert_eq!(resolve_user_agent(None), DEFAULT_USER_AGENT);
        assert_eq!(resolve_user_agent(Some("  ")), DEFAULT_USER_AGENT);
        assert_eq!(resolve_user_agent(Some("MyBot/1.0")), "MyBot/1.0");
    }

    #[test]
    fn test_impersonate_is_stable_chrome() {
        let ua = resolve_user_agent(Some("Impersonate"));
        assert!(ua.contains("Chrome/"));
        assert_eq!(ua, resolve_user_agent(Some("impersonate")));
    }
}
