//! Remote widget package catalog
//!
//! Fetches the catalog document from a configured URL and filters its items
//! by app compatibility, sport, and minimum trust. Catalog items are
//! transient: they are re-fetched per browse session and never persisted.

use sdk::errors::PackageError;
use sdk::manifest::{CatalogItem, CatalogResponse};
use sdk::types::{Sport, TrustLevel};
use tracing::debug;

const USER_AGENT: &str = "stryde-engine/0.1.0";

/// HTTP client for the remote catalog endpoint
pub struct CatalogClient {
    client: reqwest::Client,
}

impl CatalogClient {
    /// Build a client with the engine user agent
    pub fn new() -> Result<Self, PackageError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| PackageError::Network(err.to_string()))?;
        Ok(Self { client })
    }

    /// Fetch and decode the catalog document
    pub async fn fetch(&self, url: &str) -> Result<CatalogResponse, PackageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| PackageError::Network(err.to_string()))?
            .error_for_status()
            .map_err(|err| PackageError::Network(err.to_string()))?;

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|err| PackageError::Network(format!("invalid catalog document: {err}")))?;

        debug!("Fetched catalog: {} item(s)", catalog.items.len());
        Ok(catalog)
    }

    /// Filter catalog items for the running app.
    ///
    /// Keeps items that are version-compatible, match the sport when one is
    /// given, and rank at or above the minimum trust level. The result is
    /// sorted by trust rank descending, ties broken by name ascending.
    pub fn filter(
        items: &[CatalogItem],
        sport: Option<Sport>,
        minimum_trust: TrustLevel,
        app_version: &str,
    ) -> Vec<CatalogItem> {
        let mut kept: Vec<CatalogItem> = items
            .iter()
            .filter(|item| item.is_compatible(app_version))
            .filter(|item| sport.map_or(true, |s| item.supported_sports.contains(&s)))
            .filter(|item| item.trust_level.rank() >= minimum_trust.rank())
            .cloned()
            .collect();

        kept.sort_by(|a, b| {
            b.trust_level
                .rank()
                .cmp(&a.trust_level.rank())
                .then_with(|| a.name.cmp(&b.name))
        });
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn item(name: &str, trust: TrustLevel) -> CatalogItem {
        CatalogItem {
            package_id: format!("com.stryde.{}", name.to_lowercase()),
            name: name.to_string(),
            description: String::new(),
            version: "1.0".to_string(),
            minimum_app_version: None,
            supported_sports: BTreeSet::from([Sport::Running]),
            download_url: format!("https://packs.stryde.app/{name}.widgetpack"),
            signature: None,
            trust_level: trust,
        }
    }

    #[test]
    fn trust_ranking_is_deterministic() {
        let items = vec![
            item("Uno", TrustLevel::Unverified),
            item("Due", TrustLevel::Trusted),
            item("Tre", TrustLevel::Signed),
            item("Qua", TrustLevel::Invalid),
        ];

        let kept = CatalogClient::filter(&items, None, TrustLevel::Signed, "1.0");
        let names: Vec<&str> = kept.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Due", "Tre"]);
        assert_eq!(kept[0].trust_level, TrustLevel::Trusted);
        assert_eq!(kept[1].trust_level, TrustLevel::Signed);
    }

    #[test]
    fn equal_trust_sorts_by_name() {
        let items = vec![
            item("Bravo", TrustLevel::Signed),
            item("Alpha", TrustLevel::Signed),
            item("Zulu", TrustLevel::Trusted),
        ];

        let kept = CatalogClient::filter(&items, None, TrustLevel::Unverified, "1.0");
        let names: Vec<&str> = kept.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Zulu", "Alpha", "Bravo"]);
    }

    #[test]
    fn incompatible_items_are_excluded() {
        // catalog item requiring app 2.0 against a running 1.1 app
        let mut incompatible = item("Future", TrustLevel::Trusted);
        incompatible.minimum_app_version = Some("2.0".to_string());
        let items = vec![incompatible, item("Present", TrustLevel::Unverified)];

        let kept = CatalogClient::filter(&items, None, TrustLevel::Unverified, "1.1");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Present");
    }

    #[test]
    fn sport_filter_uses_supported_sports() {
        let mut cycling = item("Ride", TrustLevel::Signed);
        cycling.supported_sports = BTreeSet::from([Sport::Cycling]);
        let items = vec![cycling, item("Run", TrustLevel::Signed)];

        let kept =
            CatalogClient::filter(&items, Some(Sport::Cycling), TrustLevel::Unverified, "1.0");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Ride");

        let all = CatalogClient::filter(&items, None, TrustLevel::Unverified, "1.0");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn minimum_trust_is_a_rank_comparison() {
        let items = vec![item("Broken", TrustLevel::Invalid)];
        let kept = CatalogClient::filter(&items, None, TrustLevel::Invalid, "1.0");
        assert_eq!(kept.len(), 1);

        let kept = CatalogClient::filter(&items, None, TrustLevel::Unverified, "1.0");
        assert!(kept.is_empty());
    }
}
