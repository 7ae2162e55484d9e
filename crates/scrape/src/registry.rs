use std::sync::Arc;

use models::{RunScope, SourceKind};

use crate::Scraper;

/// Filter the flat scraper list by run scope.
///
/// `sites` is an exact-name allowlist that short-circuits every other
/// filter. Otherwise regions narrow first, then the per-source-type lists:
/// `Some(vec![])` excludes that source type entirely, `None` includes all
/// of it.
pub fn select(all: &[Arc<dyn Scraper>], scope: &RunScope) -> Vec<Arc<dyn Scraper>> {
    all.iter()
        .filter(|scraper| selected(scraper.as_ref(), scope))
        .cloned()
        .collect()
}

fn selected(scraper: &dyn Scraper, scope: &RunScope) -> bool {
    if let Some(sites) = &scope.sites {
        return sites.iter().any(|name| name == scraper.name());
    }

    if let Some(regions) = &scope.regions {
        if !regions
            .iter()
            .any(|region| region.eq_ignore_ascii_case(scraper.region()))
        {
            return false;
        }
    }

    let source = scraper.source();
    let site = source.site();
    match source.kind() {
        SourceKind::Retailer => match &scope.retailers {
            Some(retailers) => retailers.iter().any(|name| name.eq_ignore_ascii_case(site)),
            None => true,
        },
        SourceKind::Manufacturer => match &scope.manufacturers {
            Some(manufacturers) => manufacturers
                .iter()
                .any(|name| name.eq_ignore_ascii_case(site)),
            None => true,
        },
        _ => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ScrapedBoard, Scraper};
    use async_trait::async_trait;
    use models::SourceId;

    struct Fake {
        name: &'static str,
        source: SourceId,
        region: &'static str,
    }

    #[async_trait]
    impl Scraper for Fake {
        fn name(&self) -> &str {
            self.name
        }
        fn source(&self) -> SourceId {
            self.source.clone()
        }
        fn region(&self) -> &str {
            self.region
        }
        async fn scrape(&self, _scope: &RunScope) -> anyhow::Result<Vec<ScrapedBoard>> {
            Ok(vec![])
        }
    }

    fn fixture() -> Vec<Arc<dyn Scraper>> {
        vec![
            Arc::new(Fake {
                name: "tactics",
                source: SourceId::retailer("tactics"),
                region: "us",
            }),
            Arc::new(Fake {
                name: "evo",
                source: SourceId::retailer("evo"),
                region: "us",
            }),
            Arc::new(Fake {
                name: "hellobsek",
                source: SourceId::retailer("hellobsek"),
                region: "kr",
            }),
            Arc::new(Fake {
                name: "burton",
                source: SourceId::manufacturer("burton"),
                region: "us",
            }),
        ]
    }

    fn names(selected: &[Arc<dyn Scraper>]) -> Vec<&str> {
        selected.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn default_scope_selects_everything() {
        assert_eq!(
            names(&select(&fixture(), &RunScope::default())),
            vec!["tactics", "evo", "hellobsek", "burton"]
        );
    }

    #[test]
    fn sites_is_an_exact_name_allowlist() {
        let scope = RunScope {
            sites: Some(vec!["evo".to_string()]),
            // Other filters are ignored when sites is present.
            retailers: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(names(&select(&fixture(), &scope)), vec!["evo"]);
    }

    #[test]
    fn empty_list_excludes_the_source_type() {
        let scope = RunScope {
            retailers: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(names(&select(&fixture(), &scope)), vec!["burton"]);

        let scope = RunScope {
            manufacturers: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(
            names(&select(&fixture(), &scope)),
            vec!["tactics", "evo", "hellobsek"]
        );
    }

    #[test]
    fn regions_narrow_before_source_lists() {
        let scope = RunScope {
            regions: Some(vec!["kr".to_string()]),
            ..Default::default()
        };
        assert_eq!(names(&select(&fixture(), &scope)), vec!["hellobsek"]);
    }

    #[test]
    fn retailer_list_matches_site_names() {
        let scope = RunScope {
            retailers: Some(vec!["Tactics".to_string()]),
            manufacturers: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(names(&select(&fixture(), &scope)), vec!["tactics"]);
    }
}
