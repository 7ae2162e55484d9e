use models::RunScope;
use serde::Deserialize;

/// The JSON action document accepted on stdin or as a file argument.
/// Several legacy action names all map onto `run`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    #[serde(
        rename = "run",
        alias = "metadata-check",
        alias = "run-full",
        alias = "full-pipeline",
        alias = "scrape-specs",
        alias = "run-manufacturers"
    )]
    Run {
        #[serde(flatten)]
        scope: RunScope,
    },

    #[serde(rename = "slow-scrape", rename_all = "camelCase")]
    SlowScrape {
        #[serde(default)]
        delay_ms: Option<u64>,
        #[serde(default)]
        max_pages: Option<usize>,
        #[serde(default)]
        use_system_chrome: Option<bool>,
    },

    #[serde(rename = "scrape-status")]
    ScrapeStatus,
}

#[cfg(test)]
mod test {
    use super::*;
    use models::RunStage;

    #[test]
    fn run_action_with_scope() {
        let action: Action = serde_json::from_str(
            r#"{"action": "run", "retailers": ["tactics"], "from": "review-sites"}"#,
        )
        .unwrap();
        let Action::Run { scope } = action else {
            panic!("expected run");
        };
        assert_eq!(scope.retailers, Some(vec!["tactics".to_string()]));
        assert_eq!(scope.from, RunStage::ReviewSites);
    }

    #[test]
    fn legacy_aliases_map_to_run() {
        for alias in [
            "metadata-check",
            "run-full",
            "full-pipeline",
            "scrape-specs",
            "run-manufacturers",
        ] {
            let doc = format!(r#"{{"action": "{alias}"}}"#);
            let action: Action = serde_json::from_str(&doc).unwrap();
            assert!(matches!(action, Action::Run { .. }), "{alias}");
        }
    }

    #[test]
    fn slow_scrape_parameters() {
        let action: Action = serde_json::from_str(
            r#"{"action": "slow-scrape", "delayMs": 250, "maxPages": 10, "useSystemChrome": true}"#,
        )
        .unwrap();
        let Action::SlowScrape {
            delay_ms,
            max_pages,
            use_system_chrome,
        } = action
        else {
            panic!("expected slow-scrape");
        };
        assert_eq!(delay_ms, Some(250));
        assert_eq!(max_pages, Some(10));
        assert_eq!(use_system_chrome, Some(true));
    }

    #[test]
    fn scrape_status_has_no_parameters() {
        let action: Action = serde_json::from_str(r#"{"action": "scrape-status"}"#).unwrap();
        assert!(matches!(action, Action::ScrapeStatus));
    }
}
