//! Display helpers for story lists.

use chrono::Utc;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Host of an absolute http(s) URL, with a leading `www.` removed.
///
/// Returns `None` for anything that does not parse or has no host.
pub fn domain_from_url(input: &str) -> Option<String> {
    let parsed = url::Url::parse(input.trim()).ok()?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return None,
    }

    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);

    if host.is_empty() { None } else { Some(host) }
}

/// Relative label for `unix_secs` as seen at `now_secs`.
///
/// Under a minute (or in the future) is "just now"; then whole minutes,
/// hours and days.
pub fn format_time_ago(unix_secs: i64, now_secs: i64) -> String {
    let elapsed = now_secs.saturating_sub(unix_secs);

    if elapsed < MINUTE {
        "just now".to_string()
    } else if elapsed < HOUR {
        format!("{}m ago", elapsed / MINUTE)
    } else if elapsed < DAY {
        format!("{}h ago", elapsed / HOUR)
    } else {
        format!("{}d ago", elapsed / DAY)
    }
}

/// [`format_time_ago`] against the current clock.
pub fn time_ago(unix_secs: i64) -> String {
    format_time_ago(unix_secs, Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_basic() {
        assert_eq!(domain_from_url("https://example.com/one").as_deref(), Some("example.com"));
        assert_eq!(domain_from_url("http://blog.example.org:8080/a?b=c#d").as_deref(), Some("blog.example.org"));
    }

    #[test]
    fn test_domain_strips_www() {
        assert_eq!(domain_from_url("https://www.getdropbox.com/u/2/screencast.html").as_deref(), Some("getdropbox.com"));
        assert_eq!(domain_from_url("https://WWW.Example.COM").as_deref(), Some("example.com"));
    }

    #[test]
    fn test_domain_unparseable() {
        assert_eq!(domain_from_url("not a url"), None);
        assert_eq!(domain_from_url(""), None);
        assert_eq!(domain_from_url("example.com/path"), None);
        assert_eq!(domain_from_url("mailto:pg@ycombinator.com"), None);
        assert_eq!(domain_from_url("file:///etc/hosts"), None);
    }

    #[test]
    fn test_time_ago_thresholds() {
        let now = 1_700_000_000;
        assert_eq!(format_time_ago(now - 30, now), "just now");
        assert_eq!(format_time_ago(now - 59, now), "just now");
        assert_eq!(format_time_ago(now - 60, now), "1m ago");
        assert_eq!(format_time_ago(now - 3599, now), "59m ago");
        assert_eq!(format_time_ago(now - 3600, now), "1h ago");
        assert_eq!(format_time_ago(now - 86_399, now), "23h ago");
        assert_eq!(format_time_ago(now - 86_400, now), "1d ago");
        assert_eq!(format_time_ago(now - 10 * 86_400, now), "10d ago");
    }

    #[test]
    fn test_time_ago_future() {
        let now = 1_700_000_000;
        assert_eq!(format_time_ago(now + 500, now), "just now");
    }

    #[test]
    fn test_time_ago_now() {
        let now = Utc::now().timestamp();
        assert_eq!(time_ago(now - 2 * 3600), "2h ago");
    }
}
