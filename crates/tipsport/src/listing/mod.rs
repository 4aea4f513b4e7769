//! Fetch and parse of the live-programme match listing.
//!
//! Partial results win over total failure: a row that does not deserialize
//! is skipped with a warning, and zero scheduled matches yields an empty
//! vector, never an error.

pub mod models;

use tracing::{debug, warn};

use crate::client::SessionClient;
use crate::error::TipsportError;
use crate::site::{CompetitionGroup, SiteVariant};
use models::{LiveProgram, Match, RawMatch};

const LIVE_PROGRAM_PATH: &str = "/rest/articles/v1/tv/program?listTvChannels=false&sport=ICE_HOCKEY";

pub async fn get_matches(
    client: &mut SessionClient,
    site: SiteVariant,
    group: CompetitionGroup,
) -> Result<Vec<Match>, TipsportError> {
    let url = format!("{}{LIVE_PROGRAM_PATH}", site.base_url());
    let body = client.get_text(&url).await?;
    parse_matches(&body, site, group)
}

pub(crate) fn parse_matches(
    body: &str,
    site: SiteVariant,
    group: CompetitionGroup,
) -> Result<Vec<Match>, TipsportError> {
    let program: LiveProgram = serde_json::from_str(body)
        .map_err(|e| TipsportError::Other(format!("unexpected live programme response: {e}")))?;

    let mut matches = Vec::new();
    for row in program.matches {
        match serde_json::from_value::<RawMatch>(row) {
            Ok(raw) => {
                if group.matches_competition(&raw.competition) {
                    matches.push(Match::from_raw(raw, site));
                }
            }
            Err(e) => {
                warn!(error = %e, "skipping unparseable listing row");
            }
        }
    }
    debug!(group = %group, count = matches.len(), "parsed live programme");
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MATCH_PROGRAM: &str = r#"{
        "matches": [
            {
                "id": 4321001,
                "name": "HC Sparta Praha - HC Kometa Brno",
                "competition": "Tipsport extraliga",
                "url": "/live/hokej/4321001",
                "iconName": "icehockey.png",
                "matchStartTime": "2026-01-10T17:00:00Z",
                "score": "1:0",
                "statusText": "1. třetina",
                "liveStreamAvailable": true
            },
            {
                "id": 4321002,
                "name": "Mountfield HK - HC Oceláři Třinec",
                "competition": "Tipsport extraliga",
                "matchStartTime": "2026-01-10T18:30:00Z",
                "liveStreamAvailable": false
            }
        ]
    }"#;

    #[test]
    fn parses_started_and_scheduled_matches() {
        let matches = parse_matches(
            TWO_MATCH_PROGRAM,
            SiteVariant::TipsportCz,
            CompetitionGroup::CzTipsport,
        )
        .unwrap();
        assert_eq!(matches.len(), 2);

        let started = &matches[0];
        assert!(started.started);
        assert!(started.stream_enabled);
        assert_eq!(started.score, "1:0");
        assert_eq!(started.status, "1. třetina");
        assert_eq!(started.first_team, "HC Sparta Praha");
        assert_eq!(started.second_team, "HC Kometa Brno");
        assert_eq!(started.url, "https://www.tipsport.cz/live/hokej/4321001");

        let scheduled = &matches[1];
        assert!(!scheduled.started);
        assert!(!scheduled.stream_enabled);
        assert_eq!(scheduled.score, "");
        assert_eq!(scheduled.start_time_label().unwrap(), "18:30");
        // No explicit url in the row, built from the match id.
        assert_eq!(scheduled.url, "https://www.tipsport.cz/live/zapas/4321002");
    }

    #[test]
    fn filters_by_competition_group() {
        let matches = parse_matches(
            TWO_MATCH_PROGRAM,
            SiteVariant::TipsportSk,
            CompetitionGroup::SkTipsport,
        )
        .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn empty_programme_yields_empty_vec() {
        let matches = parse_matches(
            r#"{"matches": []}"#,
            SiteVariant::TipsportCz,
            CompetitionGroup::CzTipsport,
        )
        .unwrap();
        assert!(matches.is_empty());

        // A missing matches field is the site's way of saying "nothing today".
        let matches = parse_matches(
            "{}",
            SiteVariant::TipsportCz,
            CompetitionGroup::CzTipsport,
        )
        .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn bad_row_is_skipped_not_fatal() {
        let body = r#"{
            "matches": [
                {"competition": "Tipsport extraliga", "name": 42},
                {
                    "id": 4321003,
                    "name": "BK Mladá Boleslav - HC Plzeň",
                    "competition": "Tipsport extraliga",
                    "liveStreamAvailable": true
                }
            ]
        }"#;
        let matches = parse_matches(
            body,
            SiteVariant::TipsportCz,
            CompetitionGroup::CzTipsport,
        )
        .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "BK Mladá Boleslav - HC Plzeň");
    }

    #[test]
    fn garbage_body_is_a_top_level_error() {
        let err = parse_matches(
            "<html>maintenance</html>",
            SiteVariant::TipsportCz,
            CompetitionGroup::CzTipsport,
        )
        .unwrap_err();
        assert!(matches!(err, TipsportError::Other(_)));
    }
}
