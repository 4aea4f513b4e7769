use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which of the Tipsport-family sites the account lives on. The login flow
/// and URL shapes are identical, only the host differs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteVariant {
    TipsportCz,
    ChanceCz,
    TipsportSk,
}

impl SiteVariant {
    pub fn base_url(&self) -> &'static str {
        match self {
            SiteVariant::TipsportCz => "https://www.tipsport.cz",
            SiteVariant::ChanceCz => "https://www.chance.cz",
            SiteVariant::TipsportSk => "https://www.tipsport.sk",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteVariant::TipsportCz => "cz-tipsport",
            SiteVariant::ChanceCz => "cz-chance",
            SiteVariant::TipsportSk => "sk-tipsport",
        }
    }
}

impl FromStr for SiteVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cz-tipsport" | "tipsport.cz" => Ok(SiteVariant::TipsportCz),
            "cz-chance" | "chance.cz" => Ok(SiteVariant::ChanceCz),
            "sk-tipsport" | "tipsport.sk" => Ok(SiteVariant::TipsportSk),
            other => Err(format!("unknown site variant: {other}")),
        }
    }
}

impl fmt::Display for SiteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three fixed competition groups the listing can be filtered by.
///
/// `folder_code` is the site-internal identifier used in menu URLs;
/// `aliases` are the competition names the listing rows carry (they changed
/// over the years with sponsor renames, so each group accepts several).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionGroup {
    CzTipsport,
    CzChance,
    SkTipsport,
}

impl CompetitionGroup {
    pub fn folder_code(&self) -> &'static str {
        match self {
            CompetitionGroup::CzTipsport => "CZ_TIPSPORT",
            CompetitionGroup::CzChance => "CZ_CHANCE",
            CompetitionGroup::SkTipsport => "SK_TIPSPORT",
        }
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CompetitionGroup::CzTipsport => &["Tipsport extraliga", "CZ Tipsport extraliga"],
            CompetitionGroup::CzChance => &["Chance liga", "CZ Chance liga", "1. liga"],
            CompetitionGroup::SkTipsport => &["Tipsport liga", "SK Tipsport liga"],
        }
    }

    pub fn matches_competition(&self, competition: &str) -> bool {
        let competition = competition.trim();
        self.aliases()
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(competition))
    }
}

impl FromStr for CompetitionGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "CZ_TIPSPORT" => Ok(CompetitionGroup::CzTipsport),
            "CZ_CHANCE" => Ok(CompetitionGroup::CzChance),
            "SK_TIPSPORT" => Ok(CompetitionGroup::SkTipsport),
            other => Err(format!("unknown competition group: {other}")),
        }
    }
}

impl fmt::Display for CompetitionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_code())
    }
}

/// Which stream-list entry to pick when a match offers several qualities.
/// Selection is deterministic for a fixed candidate set, see
/// `stream::playlist::select_stream`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum QualityPreference {
    Highest,
    Lowest,
    /// Exact quality label (e.g. "1280x720"); falls back to `Highest` when
    /// no candidate carries the label.
    Label(String),
}

impl FromStr for QualityPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "highest" | "best" => Ok(QualityPreference::Highest),
            "lowest" | "worst" => Ok(QualityPreference::Lowest),
            "" => Err("empty quality preference".to_string()),
            _ => Ok(QualityPreference::Label(s.to_string())),
        }
    }
}

/// Immutable login input, owned by the resolver aggregate and persisted with
/// it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub quality: QualityPreference,
    pub site: SiteVariant,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        quality: QualityPreference,
        site: SiteVariant,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            quality,
            site,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_variant_round_trips() {
        for variant in [
            SiteVariant::TipsportCz,
            SiteVariant::ChanceCz,
            SiteVariant::TipsportSk,
        ] {
            assert_eq!(variant.as_str().parse::<SiteVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn group_parses_folder_codes() {
        assert_eq!(
            "CZ_TIPSPORT".parse::<CompetitionGroup>().unwrap(),
            CompetitionGroup::CzTipsport
        );
        assert_eq!(
            "sk-tipsport".parse::<CompetitionGroup>().unwrap(),
            CompetitionGroup::SkTipsport
        );
        assert!("ELH".parse::<CompetitionGroup>().is_err());
    }

    #[test]
    fn group_alias_matching_ignores_case_and_whitespace() {
        let group = CompetitionGroup::CzTipsport;
        assert!(group.matches_competition("Tipsport extraliga"));
        assert!(group.matches_competition("  tipsport EXTRALIGA "));
        assert!(!group.matches_competition("Chance liga"));
    }

    #[test]
    fn quality_preference_parsing() {
        assert_eq!(
            "highest".parse::<QualityPreference>().unwrap(),
            QualityPreference::Highest
        );
        assert_eq!(
            "worst".parse::<QualityPreference>().unwrap(),
            QualityPreference::Lowest
        );
        assert_eq!(
            "1280x720".parse::<QualityPreference>().unwrap(),
            QualityPreference::Label("1280x720".to_string())
        );
        assert!("".parse::<QualityPreference>().is_err());
    }
}
