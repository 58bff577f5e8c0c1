//! Calendar feed download.
//!
//! Calendar hosts (LMS exports in particular) tend to reject requests that do not
//! look like they come from a browser, so the fetcher sends a fixed browser identity.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::event::CalendarEvent;
use crate::ics::parse_calendar;

pub const FEED_TIMEOUT: Duration = Duration::from_secs(30);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const CALENDAR_ACCEPT: &str = "text/calendar,application/calendar,text/plain,*/*";

/// Rewrite `webcal://` / `webcals://` locators to `https://`.
///
/// Any other scheme is passed through untouched.
pub fn normalize_feed_url(locator: &str) -> SyncResult<Url> {
    let locator = locator.trim();
    let lower = locator.to_ascii_lowercase();

    let normalized = ["webcals://", "webcal://"]
        .iter()
        .find(|scheme| lower.starts_with(*scheme))
        .map(|scheme| format!("https://{}", &locator[scheme.len()..]))
        .unwrap_or_else(|| locator.to_string());

    Url::parse(&normalized)
        .map_err(|e| SyncError::Fetch(format!("invalid feed URL '{}': {}", locator, e)))
}

pub struct FeedFetcher {
    client: reqwest::Client,
    url: Url,
}

impl FeedFetcher {
    pub fn new(locator: &str) -> SyncResult<Self> {
        let url = normalize_feed_url(locator)?;

        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(FEED_TIMEOUT)
            .build()?;

        Ok(Self { client, url })
    }

    /// Download the feed and parse its events.
    #[instrument(skip(self), fields(url = %self.url), level = "info")]
    pub async fn fetch_events(&self) -> SyncResult<Vec<CalendarEvent>> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Fetch(format!("{} returned {}", self.url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Fetch(format!("could not read response body: {}", e)))?;

        let events = parse_calendar(&body)?;
        debug!(count = events.len(), "Parsed feed");

        Ok(events)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(CALENDAR_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
BEGIN:VEVENT\r\n\
UID:1\r\n\
SUMMARY:Unit 1: Intro Quiz\r\n\
DTSTART;VALUE=DATE:20250320\r\n\
DTEND;VALUE=DATE:20250321\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_webcal_becomes_https() {
        let url = normalize_feed_url("webcal://example.edu/feed.ics?token=abc").unwrap();
        assert_eq!(url.as_str(), "https://example.edu/feed.ics?token=abc");

        let url = normalize_feed_url("WEBCALS://example.edu/feed.ics").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_other_schemes_pass_through() {
        let url = normalize_feed_url("https://example.edu/feed.ics").unwrap();
        assert_eq!(url.as_str(), "https://example.edu/feed.ics");

        let url = normalize_feed_url("http://localhost:8080/feed.ics").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_invalid_locator() {
        assert!(matches!(
            normalize_feed_url("not a url"),
            Err(SyncError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feed.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ICS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new(&format!("{}/feed.ics", mock_server.uri())).unwrap();
        let events = fetcher.fetch_events().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Unit 1: Intro Quiz");

        // Both values contain commas, so compare the raw header text
        let requests = mock_server.received_requests().await.unwrap();
        let sent = |name: &str| {
            requests[0]
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        assert_eq!(sent("user-agent").as_deref(), Some(BROWSER_USER_AGENT));
        assert_eq!(sent("accept").as_deref(), Some(CALENDAR_ACCEPT));
        assert_eq!(sent("accept-language").as_deref(), Some("en-US,en;q=0.9"));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feed.ics"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new(&format!("{}/feed.ics", mock_server.uri())).unwrap();
        let result = fetcher.fetch_events().await;

        assert!(matches!(result, Err(SyncError::Fetch(msg)) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/feed.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&mock_server)
            .await;

        let fetcher = FeedFetcher::new(&format!("{}/feed.ics", mock_server.uri())).unwrap();
        let result = fetcher.fetch_events().await;

        assert!(matches!(result, Err(SyncError::IcsParse(_))));
    }
}
