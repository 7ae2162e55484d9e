use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which stage the pipeline starts from. `Scrape` is the full pipeline;
/// `ReviewSites` re-enriches already-known boards; `Resolve` only re-runs
/// spec resolution over existing provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStage {
    #[default]
    Scrape,
    ReviewSites,
    Resolve,
}

/// Constraints on a search run. For each list field, `None` means "include
/// all" while `Some(vec![])` excludes that source type entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retailers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub from: RunStage,
}

/// A persisted record of one pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRun {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub constraints: RunScope,
    pub board_count: i64,
    pub retailers_queried: i64,
    pub duration_ms: i64,
}

/// A scraper failure surfaced in the pipeline report. Failures never abort
/// the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperError {
    pub scraper: String,
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_stage_wire_values() {
        assert_eq!(
            serde_json::to_string(&RunStage::ReviewSites).unwrap(),
            "\"review-sites\""
        );
        assert_eq!(
            serde_json::from_str::<RunStage>("\"resolve\"").unwrap(),
            RunStage::Resolve
        );
    }

    #[test]
    fn scope_defaults_to_include_all() {
        let scope: RunScope = serde_json::from_str("{}").unwrap();
        assert_eq!(scope.sites, None);
        assert_eq!(scope.from, RunStage::Scrape);
    }

    #[test]
    fn empty_list_survives_round_trip() {
        let scope = RunScope {
            retailers: Some(vec![]),
            ..Default::default()
        };
        let json = serde_json::to_string(&scope).unwrap();
        let back: RunScope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.retailers, Some(vec![]));
    }
}
