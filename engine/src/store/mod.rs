//! Durable package storage
//!
//! Owns the packages directory: one blob file per installed package plus an
//! `index.json` listing every [`InstalledPackage`] record. Installing writes
//! the blob before the index; both writes go through a temp-file-then-rename
//! so a crash can never leave an index entry pointing at a missing blob.
//! There is no cross-file transaction — the blob-before-index ordering is
//! the crash-consistency mechanism.
//!
//! All mutations are serialized through one async mutex held for the whole
//! operation, so concurrent callers never observe a half-applied install or
//! removal.

use sdk::errors::PackageError;
use sdk::helpers::compare_versions;
use sdk::manifest::{InstalledPackage, Package};
use sdk::types::Template;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::registry::WidgetRegistry;
use crate::verifier::Verifier;

/// Package-specific blob extension
pub const PACKAGE_EXTENSION: &str = "widgetpack";

/// Generic structured-data extension also accepted for manual installs
pub const GENERIC_EXTENSION: &str = "json";

const INDEX_FILE: &str = "index.json";
const USER_AGENT: &str = "stryde-engine/0.1.0";

/// Seam to the host's template storage.
///
/// The store pushes installed templates through this trait so the rendering
/// layer can resolve them without knowing about packages. Calls are
/// synchronous: template state lives in memory on the host side.
pub trait TemplateSink: Send + Sync {
    /// Make the given templates available to the host
    fn register_templates(&self, templates: &[Template]);

    /// Withdraw templates by id; absent ids are ignored
    fn unregister_templates(&self, template_ids: &[String]);
}

/// In-memory [`TemplateSink`] used by the host UI and by tests
pub struct MemoryTemplateSink {
    templates: RwLock<HashMap<String, Template>>,
}

impl MemoryTemplateSink {
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a registered template by id
    pub fn template(&self, id: &str) -> Option<Template> {
        self.read_templates().get(id).cloned()
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.read_templates().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_templates().is_empty()
    }

    fn read_templates(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Template>> {
        self.templates
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryTemplateSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateSink for MemoryTemplateSink {
    fn register_templates(&self, templates: &[Template]) {
        let mut map = self
            .templates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for template in templates {
            map.insert(template.id.clone(), template.clone());
        }
    }

    fn unregister_templates(&self, template_ids: &[String]) {
        let mut map = self
            .templates
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for id in template_ids {
            map.remove(id);
        }
    }
}

/// Durable, consistent storage of installed widget packages
pub struct PackageStore {
    dir: PathBuf,
    registry: WidgetRegistry,
    templates: Arc<dyn TemplateSink>,
    verifier: Verifier,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    index: Vec<InstalledPackage>,
    loaded: bool,
}

impl PackageStore {
    /// Create a store rooted at `dir`.
    ///
    /// The directory and index are created lazily on first use.
    pub fn new(
        dir: impl Into<PathBuf>,
        registry: WidgetRegistry,
        templates: Arc<dyn TemplateSink>,
        verifier: Verifier,
    ) -> Self {
        Self {
            dir: dir.into(),
            registry,
            templates,
            verifier,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// The packages directory this store owns
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode, validate, verify, and install a package from raw bytes.
    ///
    /// The blob is persisted before the index entry; templates and
    /// definitions are registered only after both writes succeed. A failed
    /// install leaves no index entry and no blob behind.
    pub async fn install_from_bytes(&self, data: &[u8]) -> Result<InstalledPackage, PackageError> {
        let package = Package::from_slice(data)
            .map_err(|err| PackageError::InvalidPackage(format!("failed to decode package: {err}")))?;
        validate_structure(&package)?;

        let manifest = &package.manifest;
        let mut state = self.state.lock().await;
        self.ensure_index(&mut state).await?;

        if state
            .index
            .iter()
            .any(|p| p.package_id == manifest.package_id && p.version == manifest.version)
        {
            return Err(PackageError::DuplicatePackage {
                package_id: manifest.package_id.clone(),
                version: manifest.version.clone(),
            });
        }

        let report = self.verifier.verify(&package);
        if !report.is_valid() {
            return Err(PackageError::InvalidPackage(format!(
                "verification failed: {}",
                report.messages.join("; ")
            )));
        }

        fs::create_dir_all(&self.dir).await?;
        let blob_file_name = blob_file_name(&manifest.package_id, &manifest.version);
        let blob_path = self.dir.join(&blob_file_name);
        write_atomic(&blob_path, data).await?;

        let record = InstalledPackage {
            package_id: manifest.package_id.clone(),
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            installed_at: chrono::Utc::now().to_rfc3339(),
            trust_level: report.trust_level,
            blob_file_name,
            template_ids: package.template_ids(),
            definition_ids: package.definition_ids(),
        };

        state.index.push(record.clone());
        if let Err(err) = self.persist_index(&state).await {
            // undo both effects so the failed install leaves nothing behind
            state.index.pop();
            if let Err(cleanup_err) = fs::remove_file(&blob_path).await {
                warn!(
                    "Failed to clean up blob after index write failure: {}",
                    cleanup_err
                );
            }
            return Err(err);
        }

        self.templates.register_templates(&package.templates);
        self.registry.register(&package.definitions);

        info!(
            "Installed package: {} v{} ({})",
            record.package_id, record.version, record.trust_level
        );
        Ok(record)
    }

    /// Download a package document and install it.
    ///
    /// The download is buffered in memory and dropped on every exit path;
    /// nothing touches disk before verification passes.
    pub async fn install_from_url(&self, url: &str) -> Result<InstalledPackage, PackageError> {
        info!("Downloading package: {}", url);

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| PackageError::Network(err.to_string()))?;

        let bytes = client
            .get(url)
            .send()
            .await
            .map_err(|err| PackageError::Network(err.to_string()))?
            .error_for_status()
            .map_err(|err| PackageError::Network(err.to_string()))?
            .bytes()
            .await
            .map_err(|err| PackageError::Network(err.to_string()))?;

        self.install_from_bytes(&bytes).await
    }

    /// Install a package from a local file.
    ///
    /// Only the package-specific and generic structured-data extensions are
    /// accepted; anything else fails with `InvalidExtension`.
    pub async fn install_from_file(&self, path: &Path) -> Result<InstalledPackage, PackageError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");
        if extension != PACKAGE_EXTENSION && extension != GENERIC_EXTENSION {
            return Err(PackageError::InvalidExtension(extension.to_string()));
        }

        let bytes = fs::read(path).await?;
        self.install_from_bytes(&bytes).await
    }

    /// Remove one installed version, or every version when `version` is
    /// `None`.
    ///
    /// Unregistration reloads each blob best-effort; a corrupt or missing
    /// blob is logged and never blocks deleting the index entry and blob.
    pub async fn remove(
        &self,
        package_id: &str,
        version: Option<&str>,
    ) -> Result<(), PackageError> {
        let mut state = self.state.lock().await;
        self.ensure_index(&mut state).await?;

        let matched: Vec<InstalledPackage> = state
            .index
            .iter()
            .filter(|p| p.package_id == package_id && version.map_or(true, |v| p.version == v))
            .cloned()
            .collect();
        if matched.is_empty() {
            return Err(PackageError::NotInstalled(package_id.to_string()));
        }

        for record in &matched {
            self.unregister_record(record).await;

            let blob_path = self.dir.join(&record.blob_file_name);
            if let Err(err) = fs::remove_file(&blob_path).await {
                warn!(
                    "Failed to delete blob for {} v{}: {}",
                    record.package_id, record.version, err
                );
            }
        }

        state
            .index
            .retain(|p| !(p.package_id == package_id && version.map_or(true, |v| p.version == v)));
        self.persist_index(&state).await?;

        info!(
            "Removed package: {} ({} record(s))",
            package_id,
            matched.len()
        );
        Ok(())
    }

    /// All installed packages, sorted by package id ascending and version
    /// descending within an id.
    pub async fn list(&self) -> Result<Vec<InstalledPackage>, PackageError> {
        let mut state = self.state.lock().await;
        self.ensure_index(&mut state).await?;

        let mut packages = state.index.clone();
        packages.sort_by(|a, b| {
            a.package_id
                .cmp(&b.package_id)
                .then_with(|| compare_versions(&b.version, &a.version))
        });
        Ok(packages)
    }

    /// Whether the exact `(package_id, version)` pair is installed
    pub async fn is_installed(
        &self,
        package_id: &str,
        version: &str,
    ) -> Result<bool, PackageError> {
        let mut state = self.state.lock().await;
        self.ensure_index(&mut state).await?;
        Ok(state
            .index
            .iter()
            .any(|p| p.package_id == package_id && p.version == version))
    }

    /// Re-register every installed package's templates and definitions.
    ///
    /// Called once at process start to repopulate the registry from the
    /// index. Records whose blob cannot be reloaded are logged and skipped.
    /// Returns the number of packages restored.
    pub async fn restore(&self) -> Result<usize, PackageError> {
        let mut state = self.state.lock().await;
        self.ensure_index(&mut state).await?;

        let mut restored = 0;
        let records = state.index.clone();
        for record in &records {
            match self.reload_package(record).await {
                Some(package) => {
                    self.templates.register_templates(&package.templates);
                    self.registry.register(&package.definitions);
                    restored += 1;
                }
                None => {
                    warn!(
                        "Skipping {} v{}: blob could not be reloaded",
                        record.package_id, record.version
                    );
                }
            }
        }

        info!("Restored {} installed package(s)", restored);
        Ok(restored)
    }

    /// Best-effort unregistration for one record.
    ///
    /// Prefers the ids from the reloaded blob; falls back to the ids
    /// captured in the index record when the blob is unreadable.
    async fn unregister_record(&self, record: &InstalledPackage) {
        let (template_ids, definition_ids) = match self.reload_package(record).await {
            Some(package) => (package.template_ids(), package.definition_ids()),
            None => (record.template_ids.clone(), record.definition_ids.clone()),
        };
        self.templates.unregister_templates(&template_ids);
        self.registry.unregister(&definition_ids);
    }

    async fn reload_package(&self, record: &InstalledPackage) -> Option<Package> {
        let blob_path = self.dir.join(&record.blob_file_name);
        let bytes = match fs::read(&blob_path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    "Could not read blob for {} v{}: {}",
                    record.package_id, record.version, err
                );
                return None;
            }
        };

        match Package::from_slice(&bytes) {
            Ok(package) => Some(package),
            Err(err) => {
                warn!(
                    "Could not decode blob for {} v{}: {}",
                    record.package_id, record.version, err
                );
                None
            }
        }
    }

    async fn ensure_index(&self, state: &mut StoreState) -> Result<(), PackageError> {
        if state.loaded {
            return Ok(());
        }

        let path = self.index_path();
        state.index = if path.exists() {
            let contents = fs::read_to_string(&path).await?;
            serde_json::from_str(&contents)
                .map_err(|err| PackageError::Index(format!("failed to parse index: {err}")))?
        } else {
            Vec::new()
        };
        state.loaded = true;
        Ok(())
    }

    async fn persist_index(&self, state: &StoreState) -> Result<(), PackageError> {
        let json = serde_json::to_string_pretty(&state.index)
            .map_err(|err| PackageError::Index(format!("failed to serialize index: {err}")))?;
        write_atomic(&self.index_path(), json.as_bytes()).await
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }
}

/// Structural checks that do not require verification: identity fields are
/// present, there is at least one template, and every template's sport is
/// declared by the manifest.
fn validate_structure(package: &Package) -> Result<(), PackageError> {
    let manifest = &package.manifest;
    if manifest.package_id.trim().is_empty() {
        return Err(PackageError::InvalidPackage(
            "package_id cannot be empty".to_string(),
        ));
    }
    if manifest.name.trim().is_empty() {
        return Err(PackageError::InvalidPackage(
            "name cannot be empty".to_string(),
        ));
    }
    if package.templates.is_empty() {
        return Err(PackageError::InvalidPackage(
            "package contains no templates".to_string(),
        ));
    }
    for template in &package.templates {
        if !manifest.supported_sports.contains(&template.sport) {
            return Err(PackageError::InvalidPackage(format!(
                "template '{}' declares sport '{}' not in supported_sports",
                template.id, template.sport
            )));
        }
    }
    Ok(())
}

/// Single-file atomic write: write to a sibling temp file, then rename over
/// the destination.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), PackageError> {
    let tmp = tmp_path(path);
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn blob_file_name(package_id: &str, version: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitized(package_id),
        sanitized(version),
        PACKAGE_EXTENSION
    )
}

/// Replace every character outside `[A-Za-z0-9._-]` so ids and versions can
/// never smuggle path separators into the blob file name.
fn sanitized(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn blob_file_names_are_deterministic() {
        assert_eq!(
            blob_file_name("com.stryde.trail", "1.2"),
            "com.stryde.trail_1.2.widgetpack"
        );
        assert_eq!(
            blob_file_name("bad/id\\here", "1.0 beta"),
            "bad-id-here_1.0-beta.widgetpack"
        );
    }

    #[test]
    fn tmp_path_appends_to_the_full_file_name() {
        let path = Path::new("/packages/a_1.0.widgetpack");
        assert_eq!(
            tmp_path(path),
            Path::new("/packages/a_1.0.widgetpack.tmp")
        );
    }

    proptest! {
        #[test]
        fn sanitized_names_never_contain_path_separators(
            package_id in ".*",
            version in ".*",
        ) {
            let name = blob_file_name(&package_id, &version);
            prop_assert!(!name.contains('/'));
            prop_assert!(!name.contains('\\'));
            prop_assert!(name.ends_with(".widgetpack"));
        }

        #[test]
        fn sanitizing_is_idempotent(component in ".*") {
            let once = sanitized(&component);
            prop_assert_eq!(sanitized(&once), once);
        }
    }
}
