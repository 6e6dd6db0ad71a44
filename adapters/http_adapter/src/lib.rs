use std::time::Duration;

use ninefive_core::domain::RawVictim;
use ninefive_core::error::AnalysisError;
use ninefive_core::ports::{Result, VictimSource};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "https://api.ransomware.live";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One entry of the `/victims/{year}` payload. Field names moved between API
/// versions, so every known spelling is read and the first non-empty one wins.
#[derive(Debug, Default, Deserialize)]
struct ApiVictim {
    group_name: Option<String>,
    group: Option<String>,
    discovered: Option<String>,
    published: Option<String>,
    attackdate: Option<String>,
    post_title: Option<String>,
    victim: Option<String>,
}

fn first_present(candidates: [Option<String>; 3]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

impl From<ApiVictim> for RawVictim {
    fn from(v: ApiVictim) -> Self {
        RawVictim {
            group: first_present([v.group_name, v.group, None]),
            discovered: first_present([v.discovered, v.published, v.attackdate]),
            victim: first_present([v.post_title, v.victim, None]),
        }
    }
}

/// Decodes a `/victims/{year}` body. Entries that are not objects or carry
/// wrongly typed fields come back empty so the caller counts them as skipped.
pub fn parse_victims(body: &str) -> serde_json::Result<Vec<RawVictim>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(body)?;
    Ok(entries
        .into_iter()
        .map(|entry| match serde_json::from_value::<ApiVictim>(entry) {
            Ok(v) => RawVictim::from(v),
            Err(e) => {
                debug!(error = %e, "undecodable victim entry");
                RawVictim::default()
            }
        })
        .collect())
}

/// VictimSource backed by the ransomware.live HTTP API
pub struct RansomwareLiveClient {
    base_url: String,
    client: Client,
}

impl RansomwareLiveClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("ninefive/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn year_url(&self, year: i32) -> String {
        format!("{}/victims/{}", self.base_url, year)
    }
}

impl VictimSource for RansomwareLiveClient {
    fn fetch_year(&self, year: i32) -> Result<Vec<RawVictim>> {
        let url = self.year_url(year);
        info!(%url, "fetching victims");

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| AnalysisError::fetch(year, e.to_string()))?;

        parse_victims(&body)
            .map_err(|e| AnalysisError::fetch(year, format!("invalid JSON payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_victims_v1_payload() {
        let body = r#"[
            {
                "post_title": "acme.com",
                "group_name": "lockbit3",
                "discovered": "2024-01-02 10:11:12.345678",
                "published": "2024-01-01 23:00:00.000000",
                "country": "US"
            }
        ]"#;
        let victims = parse_victims(body).unwrap();
        assert_eq!(
            victims,
            vec![RawVictim {
                group: Some("lockbit3".to_string()),
                discovered: Some("2024-01-02 10:11:12.345678".to_string()),
                victim: Some("acme.com".to_string()),
            }]
        );
    }

    #[test]
    fn test_parse_victims_alternate_field_names() {
        let body = r#"[{"victim": "globex", "group": "akira", "attackdate": "", "published": "2024-05-06 07:08:09"}]"#;
        let victims = parse_victims(body).unwrap();
        assert_eq!(victims[0].group.as_deref(), Some("akira"));
        assert_eq!(victims[0].discovered.as_deref(), Some("2024-05-06 07:08:09"));
        assert_eq!(victims[0].victim.as_deref(), Some("globex"));
    }

    #[test]
    fn test_parse_victims_keeps_bad_entries_as_empty() {
        let body = r#"[
            {"group_name": "play", "discovered": "2024-01-02 10:11:12"},
            42,
            {"group_name": 7, "discovered": "2024-01-02 10:11:12"},
            {"group_name": null, "discovered": null}
        ]"#;
        let victims = parse_victims(body).unwrap();
        assert_eq!(victims.len(), 4);
        assert_eq!(victims[0].victim, None);
        assert_eq!(victims[1], RawVictim::default());
        assert_eq!(victims[2], RawVictim::default());
        assert_eq!(victims[3], RawVictim::default());
    }

    #[test]
    fn test_parse_victims_rejects_non_array() {
        assert!(parse_victims(r#"{"error": "rate limited"}"#).is_err());
        assert!(parse_victims("<html>").is_err());
    }

    #[test]
    fn test_year_url_trims_trailing_slash() {
        let client = RansomwareLiveClient::new("https://example.test/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.year_url(2024), "https://example.test/victims/2024");
    }

    #[test]
    fn test_unreachable_host_is_a_recoverable_fetch_error() {
        let client =
            RansomwareLiveClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.fetch_year(2024).unwrap_err();
        assert!(matches!(err, AnalysisError::Fetch { year: 2024, .. }));
        assert!(err.is_recoverable());
    }
}
