//! Agency configuration for Transport for NSW (Sydney area, EFA backend).

use transito_core::{
    config::{AgencyConfig, ConfigError},
    lines::{FieldMatch, LabelSource, LineMatch, LineOutcome, LineRule, ModeOutcome},
    model::{Agencies, Capability, CapabilitySet, Region, TransportMode},
    modes::ModeTable,
    plugin::{AgencyAdapter, AgencyPorts},
    position::PositionRule,
};

const REGION: &str = "nsw";
const TIMEZONE: &str = "Australia/Sydney";

/// Leading dash some stands carry, e.g. `"- Stand A"`.
const STAND_PREFIX: &str = "- ";

/// EFA `motType` codes as used by the NSW deployment.
fn mode_table() -> Result<ModeTable, ConfigError> {
    ModeTable::new(vec![
        None,                               // 0 unused
        Some(TransportMode::SuburbanTrain), // 1 Sydney Trains
        Some(TransportMode::Subway),        // 2 Metro
        None,                               // 3 unused
        Some(TransportMode::Tram),          // 4 light rail
        Some(TransportMode::Bus),           // 5 bus
        None,                               // 6 unused
        Some(TransportMode::Bus),           // 7 coach
        None,                               // 8 unused
        Some(TransportMode::Ferry),         // 9 ferry
        None,                               // 10 unused
        Some(TransportMode::Bus),           // 11 school bus
    ])
}

fn line_rules() -> Vec<LineRule> {
    vec![
        LineRule::new(
            "train",
            LineMatch::new()
                .train_name(FieldMatch::equals("Train"))
                .symbol(FieldMatch::equals("Train")),
            LineOutcome {
                mode: ModeOutcome::Unknown,
                label: LabelSource::Fixed("Train".to_owned()),
            },
        ),
        LineRule::new(
            "metro",
            LineMatch::new()
                .train_name(FieldMatch::equals("Sydney Metro"))
                .train_num(FieldMatch::Absent),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::Subway),
                label: LabelSource::Fixed("Metro".to_owned()),
            },
        ),
    ]
}

/// Static configuration for the Sydney agency.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the static tables are malformed.
pub fn config() -> Result<AgencyConfig, ConfigError> {
    let mut config = AgencyConfig::new(
        Agencies::Sydney.into(),
        "Transport for NSW",
        Region::new(REGION)?,
        TIMEZONE,
    );
    config.capabilities = CapabilitySet::from([
        Capability::SuggestLocations,
        Capability::NearbyLocations,
        Capability::Departures,
        Capability::Trips,
        Capability::TripsVia,
        Capability::AutocompleteOneLine,
    ]);
    config.default_modes = TransportMode::ALL.into_iter().collect();
    config.modes = mode_table()?;
    config.line_rules = line_rules();
    config.position_rules = vec![
        PositionRule::Bound,
        PositionRule::StripPrefix(STAND_PREFIX.to_owned()),
    ];
    Ok(config)
}

/// Build the adapter for the Sydney agency on top of the given ports.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the configuration is malformed or a declared
/// capability has no port.
pub fn adapter(ports: AgencyPorts) -> Result<AgencyAdapter, ConfigError> {
    AgencyAdapter::new(config()?, ports)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use transito_core::lines::RawLine;
    use transito_core::model::CardinalDirection;
    use transito_core::style::StyleTable;

    fn sydney() -> AgencyConfig {
        config().expect("static config is valid")
    }

    #[test]
    fn generic_train_sentinel_has_no_mode() {
        let raw = RawLine {
            train_name: Some("Train".to_owned()),
            symbol: Some("Train".to_owned()),
            mode_code: Some(1),
            ..RawLine::default()
        };
        let line = sydney().normalize_line(&raw);
        assert_eq!(line.label.as_deref(), Some("Train"));
        assert_eq!(line.mode, None);
    }

    #[test]
    fn named_train_line_keeps_symbol() {
        let raw = RawLine {
            train_name: Some("Train".to_owned()),
            symbol: Some("T1".to_owned()),
            mode_code: Some(1),
            ..RawLine::default()
        };
        let line = sydney().normalize_line(&raw);
        assert_eq!(line.label.as_deref(), Some("T1"));
        assert_eq!(line.mode, Some(TransportMode::SuburbanTrain));
    }

    #[test]
    fn metro_without_number_is_subway() {
        let raw = RawLine {
            train_name: Some("Sydney Metro".to_owned()),
            symbol: Some("M1".to_owned()),
            ..RawLine::default()
        };
        let line = sydney().normalize_line(&raw);
        assert_eq!(line.label.as_deref(), Some("Metro"));
        assert_eq!(line.mode, Some(TransportMode::Subway));
    }

    #[test]
    fn positions_parse_bounds_and_stands() {
        let config = sydney();

        let north = config.normalize_position(Some("N-bound")).expect("present");
        assert_eq!(north.direction, CardinalDirection::parse("N"));

        let north_east = config.normalize_position(Some("ne-bound")).expect("present");
        assert_eq!(north_east.direction.as_ref().map(CardinalDirection::as_str), Some("NE"));

        let stand = config.normalize_position(Some("- Stand A")).expect("present");
        assert_eq!(stand.name, "Stand A");
        assert_eq!(stand.direction, None);

        let platform = config.normalize_position(Some("Platform 3")).expect("present");
        assert_eq!(platform.name, "Platform 3");

        assert_eq!(config.normalize_position(None), None);
    }

    #[test]
    fn product_mask_follows_mode_table() {
        let config = sydney();
        let modes: BTreeSet<_> = [TransportMode::Ferry].into_iter().collect();
        assert_eq!(config.modes.mask_of(&modes), 1 << 9);
        let buses = config.modes.modes_of_mask((1 << 5) | (1 << 11));
        assert_eq!(buses, [TransportMode::Bus].into_iter().collect());
    }

    #[test]
    fn declares_every_capability_and_standard_styles() {
        let config = sydney();
        assert_eq!(config.capabilities.len(), 6);
        assert!(config.capabilities.contains(Capability::AutocompleteOneLine));
        assert_eq!(config.style_table(), StyleTable::standard());
    }
}
