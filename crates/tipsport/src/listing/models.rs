use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::site::SiteVariant;

/// Top-level shape of the live-program endpoint. Rows are kept as raw JSON
/// values so one malformed row cannot fail the whole listing.
#[derive(Deserialize, Debug)]
pub(crate) struct LiveProgram {
    #[serde(default)]
    pub matches: Vec<serde_json::Value>,
}

/// One listing row as the site serves it.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMatch {
    pub id: u64,
    pub name: String,
    pub competition: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub match_start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    /// Mirrors the play button in the site markup; absent/disabled button
    /// means the row is listed but not watchable.
    #[serde(default)]
    pub live_stream_available: bool,
}

/// A parsed match record. Identity is `url`; consumers treat the record as
/// read-only.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Match {
    pub name: String,
    pub url: String,
    pub icon_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub started: bool,
    pub score: String,
    pub status: String,
    pub first_team: String,
    pub second_team: String,
    pub stream_enabled: bool,
}

impl Match {
    pub(crate) fn from_raw(raw: RawMatch, site: SiteVariant) -> Self {
        let url = match raw.url {
            Some(path) if path.starts_with("http") => path,
            Some(path) => format!("{}{}", site.base_url(), path),
            None => format!("{}/live/zapas/{}", site.base_url(), raw.id),
        };

        let (first_team, second_team) = match raw.name.split_once(" - ") {
            Some((first, second)) => (first.trim().to_string(), second.trim().to_string()),
            None => (raw.name.clone(), String::new()),
        };

        let score = raw.score.unwrap_or_default();
        let started = !score.is_empty();

        Self {
            name: raw.name,
            url,
            icon_name: raw.icon_name,
            start_time: raw.match_start_time,
            started,
            score,
            status: raw.status_text.unwrap_or_default(),
            first_team,
            second_team,
            stream_enabled: raw.live_stream_available,
        }
    }

    /// Start time as the site shows it in the programme ("18:00").
    pub fn start_time_label(&self) -> Option<String> {
        self.start_time
            .map(|time| time.format("%H:%M").to_string())
    }
}
