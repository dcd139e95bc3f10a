//! Package, manifest, and catalog wire types
//!
//! A package blob is a single JSON document holding a manifest, its
//! templates, and optional widget definitions. The same document shape is
//! used whether the blob was downloaded from a catalog or loaded from disk.
//! Field names are snake_case; the legacy camelCase spellings used by the
//! first shipping release are accepted as deserialization aliases.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::helpers::compare_versions;
use crate::types::{Sport, Template, TrustLevel, WidgetDefinition};

/// Package metadata used for compatibility and trust decisions
///
/// Identity key for a package is `(package_id, version)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(alias = "packageID")]
    pub package_id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub version: String,

    #[serde(
        default,
        alias = "minimumAppVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_app_version: Option<String>,

    #[serde(alias = "supportedSports")]
    pub supported_sports: BTreeSet<Sport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Declared canonical digests keyed by template id. Templates without an
    /// entry are not checksum-verified.
    #[serde(
        default,
        alias = "templateChecksums",
        skip_serializing_if = "Option::is_none"
    )]
    pub template_checksums: Option<BTreeMap<String, String>>,

    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl PackageManifest {
    /// Canonical manifest bytes: the JSON document with the signature field
    /// cleared, in declaration field order. A self-signature is the SHA-256
    /// digest of exactly these bytes.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut unsigned = self.clone();
        unsigned.signature = None;
        serde_json::to_vec(&unsigned)
    }
}

/// The unit of verification and installation
///
/// A `Package` is ephemeral: it exists only while being verified and
/// installed. The raw bytes it was decoded from are what gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub manifest: PackageManifest,

    pub templates: Vec<Template>,

    #[serde(default)]
    pub definitions: Vec<WidgetDefinition>,
}

impl Package {
    /// Parse a package document from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Parse a package document from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the package document to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Ids of every template in the package, in declaration order
    pub fn template_ids(&self) -> Vec<String> {
        self.templates.iter().map(|t| t.id.clone()).collect()
    }

    /// Ids of every widget definition in the package, in declaration order
    pub fn definition_ids(&self) -> Vec<String> {
        self.definitions.iter().map(|d| d.id.clone()).collect()
    }
}

/// Persisted record of one installed package
///
/// Invariant: for every record there is exactly one blob file on disk and
/// exactly one index entry; the two are always mutated together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledPackage {
    #[serde(alias = "packageID")]
    pub package_id: String,

    pub name: String,

    pub version: String,

    /// RFC 3339 timestamp of the install
    #[serde(alias = "installedAt")]
    pub installed_at: String,

    #[serde(alias = "trustLevel")]
    pub trust_level: TrustLevel,

    #[serde(alias = "blobFileName")]
    pub blob_file_name: String,

    #[serde(default, alias = "templateIDs")]
    pub template_ids: Vec<String>,

    #[serde(default, alias = "definitionIDs")]
    pub definition_ids: Vec<String>,
}

/// Remote descriptor of an installable package
///
/// Catalog items are transient: re-fetched per browse session and never
/// persisted. Installation always goes through the package document at
/// `download_url`, never through the item itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(alias = "packageID")]
    pub package_id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub version: String,

    #[serde(
        default,
        alias = "minimumAppVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_app_version: Option<String>,

    #[serde(alias = "supportedSports")]
    pub supported_sports: BTreeSet<Sport>,

    #[serde(alias = "downloadURL")]
    pub download_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(alias = "trustLevel")]
    pub trust_level: TrustLevel,
}

impl CatalogItem {
    /// Whether the running app version satisfies this item's minimum
    pub fn is_compatible(&self, app_version: &str) -> bool {
        match &self.minimum_app_version {
            Some(required) => compare_versions(app_version, required) != Ordering::Less,
            None => true,
        }
    }
}

/// Remote catalog document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogResponse {
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    pub items: Vec<CatalogItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TemplateSlot;

    fn manifest() -> PackageManifest {
        PackageManifest {
            package_id: "com.stryde.trail".to_string(),
            name: "Trail Pack".to_string(),
            description: "Hiking layouts".to_string(),
            version: "1.1".to_string(),
            minimum_app_version: None,
            supported_sports: BTreeSet::from([Sport::Hiking]),
            signature: Some("sig-token".to_string()),
            template_checksums: None,
            created_at: None,
        }
    }

    #[test]
    fn canonical_bytes_exclude_the_signature() {
        let signed = manifest();
        let mut unsigned = manifest();
        unsigned.signature = None;

        let canonical = signed.canonical_bytes().expect("canonical bytes");
        assert_eq!(canonical, unsigned.canonical_bytes().expect("canonical bytes"));
        assert!(!String::from_utf8_lossy(&canonical).contains("sig-token"));
    }

    #[test]
    fn package_document_round_trips() {
        let package = Package {
            manifest: manifest(),
            templates: vec![Template {
                id: "summit".to_string(),
                name: "Summit".to_string(),
                sport: Sport::Hiking,
                slots: vec![TemplateSlot {
                    widget_id: "elevation".to_string(),
                    span: 2,
                }],
            }],
            definitions: Vec::new(),
        };

        let json = package.to_json().expect("serialize");
        let decoded = Package::from_json(&json).expect("deserialize");
        assert_eq!(decoded, package);
        assert_eq!(decoded.template_ids(), vec!["summit".to_string()]);
    }

    #[test]
    fn package_accepts_legacy_camel_case_fields() {
        let json = r#"{
            "manifest": {
                "packageID": "pack.a",
                "name": "Pack A",
                "version": "1.0",
                "minimumAppVersion": "2.0",
                "supportedSports": ["running"]
            },
            "templates": [
                {"id": "t1", "name": "T1", "sport": "running",
                 "slots": [{"widgetID": "pace"}]}
            ]
        }"#;

        let package = Package::from_json(json).expect("legacy document should parse");
        assert_eq!(package.manifest.package_id, "pack.a");
        assert_eq!(package.manifest.minimum_app_version.as_deref(), Some("2.0"));
        assert_eq!(package.templates[0].slots[0].widget_id, "pace");
        assert!(package.definitions.is_empty());
    }

    #[test]
    fn catalog_item_compatibility_uses_numeric_comparison() {
        let mut item = CatalogItem {
            package_id: "pack.a".to_string(),
            name: "Pack A".to_string(),
            description: String::new(),
            version: "1.0".to_string(),
            minimum_app_version: Some("2.0".to_string()),
            supported_sports: BTreeSet::from([Sport::Running]),
            download_url: "https://packs.stryde.app/pack-a.widgetpack".to_string(),
            signature: None,
            trust_level: TrustLevel::Unverified,
        };

        // the documented incompatibility scenario: app 1.1 vs required 2.0
        assert!(!item.is_compatible("1.1"));
        assert!(item.is_compatible("2.0"));
        assert!(item.is_compatible("10.0"));

        item.minimum_app_version = None;
        assert!(item.is_compatible("0.1"));
    }
}
