//! Marketplace orchestration
//!
//! Composes the catalog client, verifier, and package store behind a single
//! policy: which catalog to browse and the minimum trust level required to
//! install from it. The end-to-end flow is browse → pick an item → download
//! its package document → verify → install.

use sdk::errors::PackageError;
use sdk::manifest::{CatalogItem, InstalledPackage};
use sdk::types::{Sport, TrustLevel};
use std::sync::Arc;
use tracing::info;

use crate::catalog::CatalogClient;
use crate::store::PackageStore;

/// Marketplace policy
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// Catalog endpoint; browsing returns nothing when unset
    pub catalog_url: Option<String>,

    /// Lowest trust level an item may have and still be installable
    pub minimum_trust: TrustLevel,
}

/// End-to-end browse-and-install orchestrator
pub struct Marketplace {
    config: MarketplaceConfig,
    catalog: CatalogClient,
    store: Arc<PackageStore>,
    app_version: String,
}

impl Marketplace {
    pub fn new(
        config: MarketplaceConfig,
        store: Arc<PackageStore>,
        app_version: impl Into<String>,
    ) -> Result<Self, PackageError> {
        Ok(Self {
            config,
            catalog: CatalogClient::new()?,
            store,
            app_version: app_version.into(),
        })
    }

    /// The policy this marketplace applies
    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    /// Fetch the catalog and filter it for the running app.
    ///
    /// Returns an empty list when no catalog is configured.
    pub async fn fetch_catalog(
        &self,
        sport: Option<Sport>,
    ) -> Result<Vec<CatalogItem>, PackageError> {
        let url = match &self.config.catalog_url {
            Some(url) => url,
            None => return Ok(Vec::new()),
        };

        let response = self.catalog.fetch(url).await?;
        Ok(CatalogClient::filter(
            &response.items,
            sport,
            self.config.minimum_trust,
            &self.app_version,
        ))
    }

    /// Install a catalog item.
    ///
    /// The item may come from a stale catalog snapshot, so compatibility and
    /// minimum trust are re-checked here before anything is downloaded.
    pub async fn install(&self, item: &CatalogItem) -> Result<InstalledPackage, PackageError> {
        if !item.is_compatible(&self.app_version) {
            return Err(PackageError::IncompatibleVersion {
                required: item.minimum_app_version.clone().unwrap_or_default(),
            });
        }

        if item.trust_level.rank() < self.config.minimum_trust.rank() {
            return Err(PackageError::InvalidPackage(format!(
                "catalog item '{}' is below the minimum trust level ({})",
                item.package_id, self.config.minimum_trust
            )));
        }

        info!(
            "Installing from catalog: {} v{}",
            item.package_id, item.version
        );
        self.store.install_from_url(&item.download_url).await
    }
}
