//! Package verification
//!
//! Pure, stateless verification of widget packages: a version gate, canonical
//! SHA-256 template checksums, and a trust classification derived from the
//! manifest signature. Verification never errors; it always produces a
//! [`VerificationReport`], and installation rejects any package whose report
//! is `Invalid`.
//!
//! # Trust model
//!
//! Signatures here are opaque tokens, not a cryptographic scheme. A signature
//! matching a configured trusted token verifies as `Trusted`; a signature
//! equal to the canonical manifest digest verifies as `Signed` (the package
//! signed itself); any other non-empty signature still verifies as `Signed`
//! with an advisory message. That last rule is deliberately lenient and must
//! not be widened further.

use sdk::helpers::compare_versions;
use sdk::manifest::{Package, PackageManifest};
use sdk::types::{Template, TrustLevel, VerificationReport};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Verifies packages against the running app version and a set of trusted
/// signature tokens.
pub struct Verifier {
    app_version: String,
    trusted_tokens: HashSet<String>,
}

impl Verifier {
    /// Create a verifier for the given running app version
    pub fn new(
        app_version: impl Into<String>,
        trusted_tokens: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            app_version: app_version.into(),
            trusted_tokens: trusted_tokens.into_iter().collect(),
        }
    }

    /// The running app version packages are gated against
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// Verify a package, short-circuiting on the first failure.
    ///
    /// Checks run in order: app version gate, declared template checksums,
    /// then signature classification. The first checksum mismatch wins;
    /// remaining templates are not checked.
    pub fn verify(&self, package: &Package) -> VerificationReport {
        let manifest = &package.manifest;
        let mut messages = Vec::new();

        if let Some(required) = &manifest.minimum_app_version {
            if compare_versions(&self.app_version, required) == Ordering::Less {
                return VerificationReport::invalid(format!(
                    "requires app version {} (running {})",
                    required, self.app_version
                ));
            }
        }

        match &manifest.template_checksums {
            Some(checksums) => {
                for template in &package.templates {
                    let expected = match checksums.get(&template.id) {
                        Some(expected) => expected,
                        // Templates without a declared checksum pass unconditionally
                        None => continue,
                    };
                    if canonical_template_digest(template).as_deref() != Some(expected.as_str()) {
                        return VerificationReport::invalid(format!(
                            "checksum mismatch for template '{}'",
                            template.id
                        ));
                    }
                }
            }
            None => {
                messages.push("manifest declares no template checksums".to_string());
            }
        }

        let signature = manifest.signature.as_deref().unwrap_or("");
        if signature.is_empty() {
            return VerificationReport::with_messages(TrustLevel::Unverified, messages);
        }

        if self.trusted_tokens.contains(signature) {
            debug!("Signature matched trusted token for {}", manifest.package_id);
            return VerificationReport::with_messages(TrustLevel::Trusted, messages);
        }

        if canonical_manifest_digest(manifest).as_deref() == Some(signature) {
            return VerificationReport::with_messages(TrustLevel::Signed, messages);
        }

        messages.push("unknown signature token".to_string());
        VerificationReport::with_messages(TrustLevel::Signed, messages)
    }
}

/// Canonical SHA-256 digest of a template, hex-encoded.
///
/// Canonical form is the template's JSON in declaration field order; all
/// collection fields are ordered, so equal templates always produce equal
/// digests. Returns `None` only if serialization fails.
pub fn canonical_template_digest(template: &Template) -> Option<String> {
    canonical_digest(template)
}

/// Canonical SHA-256 digest of a manifest with its signature field cleared,
/// hex-encoded. This is the value a self-signed manifest carries as its
/// signature.
pub fn canonical_manifest_digest(manifest: &PackageManifest) -> Option<String> {
    manifest.canonical_bytes().ok().map(|bytes| hex_digest(&bytes))
}

fn canonical_digest<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_vec(value).ok().map(|bytes| hex_digest(&bytes))
}

fn hex_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
