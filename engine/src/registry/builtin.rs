//! Built-in widget definitions
//!
//! The definitions compiled into the app, one per [`WidgetKind`]. Installed
//! packages may shadow any of these by id.

use sdk::types::Capability::{
    Configurable, LiveUpdate, NeedsBarometer, NeedsHeartRate, NeedsLocation, NeedsMotion,
};
use sdk::types::Sport::{Cycling, Hiking, Indoor, Running, Strength, Swimming, Triathlon};
use sdk::types::{Capability, Sport, WidgetDefinition, WidgetKind, WidgetType};
use std::collections::BTreeSet;

const ALL_SPORTS: &[Sport] = &[
    Running, Cycling, Swimming, Hiking, Strength, Triathlon, Indoor,
];
const OUTDOOR_SPORTS: &[Sport] = &[Running, Cycling, Hiking, Triathlon];

/// The complete built-in definition set
pub fn builtin_definitions() -> Vec<WidgetDefinition> {
    WidgetKind::ALL.iter().map(|kind| definition(*kind)).collect()
}

fn definition(kind: WidgetKind) -> WidgetDefinition {
    match kind {
        WidgetKind::HeartRate => def(
            kind,
            "Heart Rate",
            "heart.pulse",
            WidgetType::Gauge,
            ALL_SPORTS,
            &[NeedsHeartRate, LiveUpdate],
        ),
        WidgetKind::Pace => def(
            kind,
            "Pace",
            "speedometer",
            WidgetType::Numeric,
            &[Running, Hiking, Triathlon],
            &[NeedsLocation, LiveUpdate],
        ),
        WidgetKind::Speed => def(
            kind,
            "Speed",
            "gauge.high",
            WidgetType::Numeric,
            &[Cycling, Triathlon],
            &[NeedsLocation, LiveUpdate],
        ),
        WidgetKind::Distance => def(
            kind,
            "Distance",
            "point.topleft.down.curvedto.point.bottomright.up",
            WidgetType::Numeric,
            ALL_SPORTS,
            &[NeedsLocation, LiveUpdate],
        ),
        WidgetKind::Duration => def(
            kind,
            "Elapsed Time",
            "stopwatch",
            WidgetType::Numeric,
            ALL_SPORTS,
            &[LiveUpdate],
        ),
        WidgetKind::Cadence => def(
            kind,
            "Cadence",
            "metronome",
            WidgetType::Numeric,
            &[Running, Cycling, Indoor],
            &[NeedsMotion, LiveUpdate],
        ),
        WidgetKind::Power => def(
            kind,
            "Power",
            "bolt",
            WidgetType::Gauge,
            &[Cycling, Indoor],
            &[LiveUpdate, Configurable],
        ),
        WidgetKind::Elevation => def(
            kind,
            "Elevation Profile",
            "mountain.2",
            WidgetType::Chart,
            OUTDOOR_SPORTS,
            &[NeedsBarometer, NeedsLocation],
        ),
        WidgetKind::Calories => def(
            kind,
            "Calories",
            "flame",
            WidgetType::Numeric,
            ALL_SPORTS,
            &[NeedsHeartRate],
        ),
        WidgetKind::LapSplits => def(
            kind,
            "Lap Splits",
            "list.number",
            WidgetType::Timeline,
            &[Running, Swimming, Triathlon],
            &[Configurable],
        ),
        WidgetKind::Clock => def(
            kind,
            "Clock",
            "clock",
            WidgetType::Numeric,
            ALL_SPORTS,
            &[],
        ),
    }
}

fn def(
    kind: WidgetKind,
    display_name: &str,
    icon_name: &str,
    widget_type: WidgetType,
    sports: &[Sport],
    capabilities: &[Capability],
) -> WidgetDefinition {
    WidgetDefinition {
        id: kind.as_str().to_string(),
        display_name: display_name.to_string(),
        icon_name: icon_name.to_string(),
        supported_sports: sports.iter().copied().collect::<BTreeSet<Sport>>(),
        widget_type,
        capabilities: capabilities.to_vec(),
        minimum_app_version: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_exactly_one_definition() {
        let definitions = builtin_definitions();
        assert_eq!(definitions.len(), WidgetKind::ALL.len());
        for kind in WidgetKind::ALL {
            assert_eq!(
                definitions.iter().filter(|d| d.id == kind.as_str()).count(),
                1,
                "missing or duplicated definition for {kind}"
            );
        }
    }

    #[test]
    fn definitions_are_structurally_complete() {
        for definition in builtin_definitions() {
            assert!(!definition.display_name.is_empty());
            assert!(!definition.icon_name.is_empty());
            assert!(!definition.supported_sports.is_empty());
        }
    }

    #[test]
    fn outdoor_sports_is_a_subset_of_all_sports() {
        for sport in OUTDOOR_SPORTS {
            assert!(ALL_SPORTS.contains(sport));
        }
    }
}
