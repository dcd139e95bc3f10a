//! Widget, template, and trust types
//!
//! Core vocabulary shared by the registry, verifier, and store: the sports a
//! widget applies to, the trust classification of a package, the declarative
//! template model, and the widget definition metadata merged into the
//! registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Sport a template or widget definition applies to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Running,
    Cycling,
    Swimming,
    Hiking,
    Strength,
    Triathlon,
    Indoor,
}

impl Sport {
    /// Stable identifier used in serialized documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
            Self::Swimming => "swimming",
            Self::Hiking => "hiking",
            Self::Strength => "strength",
            Self::Triathlon => "triathlon",
            Self::Indoor => "indoor",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trust classification for a package
///
/// Ordered from least to most trusted. The ordering governs both
/// installability (`Invalid` is never installable) and catalog ranking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    /// Failed verification — never installable
    Invalid,
    /// No signature present — installable, lowest non-invalid trust
    Unverified,
    /// Carries a signature, but not one tied to a trusted identity
    Signed,
    /// Signature matches a configured trusted token
    Trusted,
}

impl TrustLevel {
    /// Numeric rank used for catalog filtering and sorting
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Whether a package at this trust level may be installed
    pub fn is_installable(&self) -> bool {
        *self != Self::Invalid
    }

    /// Stable identifier used in serialized documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Unverified => "unverified",
            Self::Signed => "signed",
            Self::Trusted => "trusted",
        }
    }
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering style of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    Gauge,
    Numeric,
    Chart,
    Timeline,
    MapTrack,
}

/// Data or runtime capability a widget requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    NeedsHeartRate,
    NeedsLocation,
    NeedsMotion,
    NeedsBarometer,
    LiveUpdate,
    Configurable,
}

/// Built-in widget identifiers
///
/// Closed set of the widgets compiled into the host app. Installed packages
/// may introduce definitions with arbitrary string ids; these are only the
/// ids the app itself ships.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    HeartRate,
    Pace,
    Speed,
    Distance,
    Duration,
    Cadence,
    Power,
    Elevation,
    Calories,
    LapSplits,
    Clock,
}

/// Legacy view-class names from the first shipping release, paired with
/// their stable ids. Kept as one table so both lookup directions stay in
/// sync.
const LEGACY_TYPE_NAMES: &[(WidgetKind, &str)] = &[
    (WidgetKind::HeartRate, "HeartRateWidgetView"),
    (WidgetKind::Pace, "PaceWidgetView"),
    (WidgetKind::Speed, "SpeedWidgetView"),
    (WidgetKind::Distance, "DistanceWidgetView"),
    (WidgetKind::Duration, "ElapsedTimeWidgetView"),
    (WidgetKind::Cadence, "CadenceWidgetView"),
    (WidgetKind::Power, "PowerWidgetView"),
    (WidgetKind::Elevation, "ElevationProfileWidgetView"),
    (WidgetKind::Calories, "CaloriesWidgetView"),
    (WidgetKind::LapSplits, "LapSplitsWidgetView"),
    (WidgetKind::Clock, "ClockWidgetView"),
];

impl WidgetKind {
    /// All built-in widget kinds
    pub const ALL: &'static [WidgetKind] = &[
        Self::HeartRate,
        Self::Pace,
        Self::Speed,
        Self::Distance,
        Self::Duration,
        Self::Cadence,
        Self::Power,
        Self::Elevation,
        Self::Calories,
        Self::LapSplits,
        Self::Clock,
    ];

    /// Stable definition id for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::Pace => "pace",
            Self::Speed => "speed",
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Cadence => "cadence",
            Self::Power => "power",
            Self::Elevation => "elevation",
            Self::Calories => "calories",
            Self::LapSplits => "lap_splits",
            Self::Clock => "clock",
        }
    }

    /// Look up a built-in kind by its stable id
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == id)
    }

    /// The historical view-class name for this kind
    pub fn legacy_type_name(&self) -> Option<&'static str> {
        LEGACY_TYPE_NAMES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, name)| *name)
    }

    /// Resolve a historical view-class name to its stable kind
    pub fn from_legacy_type_name(name: &str) -> Option<Self> {
        LEGACY_TYPE_NAMES
            .iter()
            .find(|(_, legacy)| *legacy == name)
            .map(|(kind, _)| *kind)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One widget slot inside a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSlot {
    /// Definition id of the widget placed in this slot
    #[serde(alias = "widgetID")]
    pub widget_id: String,

    /// Number of grid columns the slot spans
    #[serde(default = "default_span")]
    pub span: u32,
}

fn default_span() -> u32 {
    1
}

/// Declarative layout template shipped inside a package
///
/// Templates are inert data: an ordered list of widget slots for one sport.
/// Canonical serialization for checksum purposes is the JSON of this struct
/// in declaration field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub sport: Sport,
    pub slots: Vec<TemplateSlot>,
}

/// Metadata describing one widget type's capabilities and supported sports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDefinition {
    /// Stable identifier; installed definitions shadow built-ins on collision
    pub id: String,

    #[serde(alias = "displayName")]
    pub display_name: String,

    #[serde(alias = "iconName")]
    pub icon_name: String,

    #[serde(alias = "supportedSports")]
    pub supported_sports: BTreeSet<Sport>,

    #[serde(alias = "widgetType")]
    pub widget_type: WidgetType,

    #[serde(default)]
    pub capabilities: Vec<Capability>,

    #[serde(
        default,
        alias = "minimumAppVersion",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_app_version: Option<String>,
}

/// Outcome of package verification
///
/// Verification never fails with an error; it always produces a report. The
/// messages are ordered advisories accumulated while checking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    #[serde(alias = "trustLevel")]
    pub trust_level: TrustLevel,

    #[serde(default)]
    pub messages: Vec<String>,
}

impl VerificationReport {
    /// Build a report at the given trust level with no messages
    pub fn new(trust_level: TrustLevel) -> Self {
        Self {
            trust_level,
            messages: Vec::new(),
        }
    }

    /// Build a report at the given trust level carrying accumulated messages
    pub fn with_messages(trust_level: TrustLevel, messages: Vec<String>) -> Self {
        Self {
            trust_level,
            messages,
        }
    }

    /// Build an `Invalid` report with a single failure message
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            trust_level: TrustLevel::Invalid,
            messages: vec![message.into()],
        }
    }

    /// A report is valid iff its trust level is not `Invalid`
    pub fn is_valid(&self) -> bool {
        self.trust_level.is_installable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trust_levels_are_totally_ordered() {
        assert!(TrustLevel::Invalid < TrustLevel::Unverified);
        assert!(TrustLevel::Unverified < TrustLevel::Signed);
        assert!(TrustLevel::Signed < TrustLevel::Trusted);
        assert_eq!(TrustLevel::Invalid.rank(), 0);
        assert_eq!(TrustLevel::Trusted.rank(), 3);
    }

    #[test]
    fn only_invalid_blocks_installation() {
        assert!(!TrustLevel::Invalid.is_installable());
        assert!(TrustLevel::Unverified.is_installable());
        assert!(TrustLevel::Signed.is_installable());
        assert!(TrustLevel::Trusted.is_installable());
    }

    #[test]
    fn legacy_name_table_is_bidirectional_and_total() {
        for kind in WidgetKind::ALL {
            let name = kind
                .legacy_type_name()
                .expect("every built-in kind has a legacy name");
            assert_eq!(WidgetKind::from_legacy_type_name(name), Some(*kind));
        }
        assert_eq!(WidgetKind::from_legacy_type_name("NoSuchView"), None);
    }

    #[test]
    fn widget_kind_ids_round_trip() {
        for kind in WidgetKind::ALL {
            assert_eq!(WidgetKind::from_id(kind.as_str()), Some(*kind));
        }
    }

    #[test]
    fn template_slot_span_defaults_to_one() {
        let slot: TemplateSlot =
            serde_json::from_str(r#"{"widget_id": "pace"}"#).expect("slot should parse");
        assert_eq!(slot.span, 1);
    }

    #[test]
    fn definition_accepts_legacy_camel_case_fields() {
        let json = r#"{
            "id": "heart_rate_zones",
            "displayName": "HR Zones",
            "iconName": "hr-zones",
            "supportedSports": ["running", "cycling"],
            "widgetType": "chart",
            "minimumAppVersion": "1.2"
        }"#;
        let definition: WidgetDefinition =
            serde_json::from_str(json).expect("definition should parse");
        assert_eq!(definition.display_name, "HR Zones");
        assert_eq!(definition.minimum_app_version.as_deref(), Some("1.2"));
        assert!(definition.supported_sports.contains(&Sport::Cycling));
        assert!(definition.capabilities.is_empty());
    }

    #[test]
    fn invalid_report_is_not_valid() {
        let report = VerificationReport::invalid("checksum mismatch");
        assert!(!report.is_valid());
        assert_eq!(report.messages, vec!["checksum mismatch".to_string()]);

        let report = VerificationReport::new(TrustLevel::Unverified);
        assert!(report.is_valid());
    }
}
