//! **TuneIn**: radio station lookup by name.
//!
//! Three requests per query:
//! 1. `{base}search/?query=<q>`: the HTML embeds `TuneIn.payload = {...}`; the first
//!    guide item of the `Stations` container is the station.
//! 2. `{base}station/?stationId=<id>`: the page carries a protocol-relative
//!    `"StreamUrl":"//..."` pointing at a stream list.
//! 3. The stream list JSON; its first `Streams[].Url` is what gets played.

use crate::config::TuneInSettings;
use crate::error::SkillResult;
use crate::resolver::{ContentResolver, ResolveError};
use once_cell::sync::Lazy;
use pagi_playback::MediaReference;
use regex::Regex;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, info};

const STATIONS_CONTAINER: &str = "Stations";

static PAYLOAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"TuneIn\.payload = (\{.*\})").unwrap_or_else(|_| unreachable!()));

static STREAM_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""StreamUrl":"(.*?)""#).unwrap_or_else(|_| unreachable!()));

/// A search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub id: String,
    pub title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SearchPayload {
    container_guide_items: ContainerGuide,
}

#[derive(Deserialize)]
struct ContainerGuide {
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Container {
    title: String,
    #[serde(default)]
    guide_items: Vec<GuideItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GuideItem {
    id: serde_json::Value,
    title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StreamList {
    #[serde(default)]
    streams: Vec<StreamEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StreamEntry {
    url: String,
}

/// Stations from a search page. No embedded payload means no results.
pub fn parse_search_page(html: &str) -> Result<Vec<Station>, ResolveError> {
    let Some(captures) = PAYLOAD_RE.captures(html) else {
        return Ok(Vec::new());
    };
    let payload: SearchPayload = serde_json::from_str(&captures[1])
        .map_err(|e| ResolveError::Lookup(format!("search payload: {}", e)))?;

    Ok(payload
        .container_guide_items
        .containers
        .into_iter()
        .find(|c| c.title == STATIONS_CONTAINER)
        .map(|c| {
            c.guide_items
                .into_iter()
                .map(|item| Station {
                    id: match item.id {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    },
                    title: item.title,
                })
                .collect()
        })
        .unwrap_or_default())
}

/// Absolute stream-list URL from a station page, if it has one.
pub fn extract_stream_list_url(html: &str) -> Option<String> {
    let captured = STREAM_URL_RE.captures(html)?.get(1)?.as_str();
    if captured.is_empty() {
        None
    } else {
        Some(format!("http:{}", captured))
    }
}

/// First stream URL of a stream-list document.
pub fn parse_stream_list(json: &str) -> Result<Option<String>, ResolveError> {
    let list: StreamList = serde_json::from_str(json)
        .map_err(|e| ResolveError::Lookup(format!("stream list: {}", e)))?;
    Ok(list.streams.into_iter().next().map(|s| s.url))
}

fn is_loopback(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.host_str().map(|host| {
                host == "localhost"
                    || host
                        .trim_matches(|c| c == '[' || c == ']')
                        .parse::<IpAddr>()
                        .map(|ip| ip.is_loopback())
                        .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

pub struct TuneInResolver {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl TuneInResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SkillResult<Self> {
        let base_url = base_url.into();
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("PAGI-Media/1.0");
        // A local mirror is reached directly, whatever the system proxy says.
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }
        Ok(Self {
            base_url,
            client: builder.build()?,
        })
    }

    pub fn from_settings(settings: &TuneInSettings) -> SkillResult<Self> {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn search(&self, query: &str) -> Result<Vec<Station>, ResolveError> {
        let url = format!("{}search/?query={}", self.base_url, urlencoding::encode(query));
        parse_search_page(&self.fetch(&url)?)
    }

    /// Playable URL for `station`, or `None` when it has no streams.
    pub fn stream_url(&self, station: &Station) -> Result<Option<String>, ResolveError> {
        let url = format!("{}station/?stationId={}", self.base_url, station.id);
        let Some(list_url) = extract_stream_list_url(&self.fetch(&url)?) else {
            return Ok(None);
        };
        parse_stream_list(&self.fetch(&list_url)?)
    }

    fn fetch(&self, url: &str) -> Result<String, ResolveError> {
        debug!(target: "pagi::tunein", url, "GET");
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|e| ResolveError::Lookup(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(ResolveError::Lookup(format!("{} returned {}", url, status)));
        }
        let body = res.bytes().map_err(|e| ResolveError::Lookup(e.to_string()))?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl ContentResolver for TuneInResolver {
    fn resolve(&self, query: &str) -> Result<MediaReference, ResolveError> {
        info!(target: "pagi::tunein", query, "searching for station");
        let station = self
            .search(query)?
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::NoMatch(query.to_string()))?;

        let url = self
            .stream_url(&station)?
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ResolveError::NoStream(station.title.clone()))?;
        info!(target: "pagi::tunein", station = %station.title, url = %url, "resolved stream");
        Ok(MediaReference::new(url, station.title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"<html><script>window.foo = 1;
TuneIn.payload = {"ContainerGuideItems":{"containers":[{"Title":"Shows","GuideItems":[{"Id":"p1","Title":"Some Show"}]},{"Title":"Stations","GuideItems":[{"Id":"s21606","Title":"WNYC 93.9"},{"Id":"s2","Title":"Other"}]}]}}
</script></html>"#;

    #[test]
    fn search_page_yields_stations_container_only() {
        let stations = parse_search_page(SEARCH_PAGE).unwrap();
        assert_eq!(
            stations,
            vec![
                Station {
                    id: "s21606".into(),
                    title: "WNYC 93.9".into()
                },
                Station {
                    id: "s2".into(),
                    title: "Other".into()
                },
            ]
        );
    }

    #[test]
    fn numeric_ids_are_kept_verbatim() {
        let html = r#"TuneIn.payload = {"ContainerGuideItems":{"containers":[{"Title":"Stations","GuideItems":[{"Id":42,"Title":"KERA"}]}]}}"#;
        assert_eq!(parse_search_page(html).unwrap()[0].id, "42");
    }

    #[test]
    fn page_without_payload_or_stations_is_empty() {
        assert!(parse_search_page("<html>nothing here</html>").unwrap().is_empty());
        let html = r#"TuneIn.payload = {"ContainerGuideItems":{"containers":[{"Title":"Shows","GuideItems":[]}]}}"#;
        assert!(parse_search_page(html).unwrap().is_empty());
    }

    #[test]
    fn malformed_payload_is_a_lookup_error() {
        let err = parse_search_page("TuneIn.payload = {not json}").unwrap_err();
        assert!(matches!(err, ResolveError::Lookup(_)));
    }

    #[test]
    fn stream_list_url_is_made_absolute() {
        let page = r#"{"Title":"WNYC","StreamUrl":"//opml.radiotime.com/Tune.ashx?id=s21606","Other":1}"#;
        assert_eq!(
            extract_stream_list_url(page).as_deref(),
            Some("http://opml.radiotime.com/Tune.ashx?id=s21606")
        );
        assert_eq!(extract_stream_list_url(r#""StreamUrl":"""#), None);
        assert_eq!(extract_stream_list_url("no stream"), None);
    }

    #[test]
    fn loopback_hosts_are_detected() {
        assert!(is_loopback("http://127.0.0.1:8080/"));
        assert!(is_loopback("http://localhost/"));
        assert!(is_loopback("http://[::1]:9000/"));
        assert!(!is_loopback("http://tunein.com/"));
        assert!(!is_loopback("not a url"));
    }

    #[test]
    fn first_stream_is_chosen() {
        let json = r#"{"Streams":[{"Url":"http://a/live.mp3","Bitrate":128},{"Url":"http://b"}]}"#;
        assert_eq!(parse_stream_list(json).unwrap().as_deref(), Some("http://a/live.mp3"));
        assert_eq!(parse_stream_list(r#"{"Streams":[]}"#).unwrap(), None);
    }
}
