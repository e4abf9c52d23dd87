//! Agency configuration for Transport for Ireland (Dublin area, EFA backend).

use transito_core::{
    config::{AgencyConfig, ConfigError},
    lines::{FieldMatch, LabelSource, LineMatch, LineOutcome, LineRule, ModeOutcome, RawField},
    model::{Agencies, Capability, CapabilitySet, Region, TransportMode},
    modes::ModeTable,
    plugin::{AgencyAdapter, AgencyPorts},
};

const REGION: &str = "tfi";
const TIMEZONE: &str = "Europe/Dublin";

/// EFA `motType` codes as used by the Irish deployment.
fn mode_table() -> Result<ModeTable, ConfigError> {
    ModeTable::new(vec![
        Some(TransportMode::RegionalTrain), // 0 train
        Some(TransportMode::SuburbanTrain), // 1 commuter rail
        None,                               // 2 metro, not operated
        None,                               // 3 light rail, Luas reports 4
        Some(TransportMode::Tram),          // 4 Luas
        Some(TransportMode::Bus),           // 5 city bus
        Some(TransportMode::Bus),           // 6 regional bus
        Some(TransportMode::Bus),           // 7 express coach
        None,                               // 8 cable car
        Some(TransportMode::Ferry),         // 9 ferry
        Some(TransportMode::OnDemand),      // 10 demand responsive
    ])
}

fn line_rules() -> Vec<LineRule> {
    vec![
        LineRule::new(
            "dart",
            LineMatch::new()
                .train_name(FieldMatch::equals("DART"))
                .train_num(FieldMatch::Absent),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::SuburbanTrain),
                label: LabelSource::Fixed("DART".to_owned()),
            },
        ),
        LineRule::new(
            "rail",
            LineMatch::new()
                .train_name(FieldMatch::equals("Rail"))
                .symbol(FieldMatch::equals("Rail")),
            LineOutcome {
                mode: ModeOutcome::Unknown,
                label: LabelSource::Fixed("Rail".to_owned()),
            },
        ),
        LineRule::new(
            "intercity",
            LineMatch::new()
                .train_type(FieldMatch::equals("IC"))
                .train_num(FieldMatch::Absent),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::RegionalTrain),
                label: LabelSource::Fixed("IC".to_owned()),
            },
        ),
        LineRule::new(
            "luas",
            LineMatch::new()
                .train_name(FieldMatch::equals("LUAS"))
                .symbol(FieldMatch::Present),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::Tram),
                label: LabelSource::Field(RawField::Symbol),
            },
        ),
    ]
}

/// Static configuration for the Dublin agency.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the static tables are malformed.
pub fn config() -> Result<AgencyConfig, ConfigError> {
    let mut config = AgencyConfig::new(
        Agencies::Dublin.into(),
        "Transport for Ireland",
        Region::new(REGION)?,
        TIMEZONE,
    );
    config.capabilities =
        CapabilitySet::from([Capability::SuggestLocations, Capability::Departures]);
    config.default_modes = TransportMode::ALL.into_iter().collect();
    config.modes = mode_table()?;
    config.line_rules = line_rules();
    Ok(config)
}

/// Build the adapter for the Dublin agency on top of the given ports.
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
    use super::*;
    use transito_core::lines::RawLine;

    fn dublin() -> AgencyConfig {
        config().expect("static config is valid")
    }

    #[test]
    fn dart_without_mode_hint_is_suburban() {
        let raw = RawLine {
            train_name: Some("DART".to_owned()),
            symbol: Some("Howth".to_owned()),
            ..RawLine::default()
        };
        let line = dublin().normalize_line(&raw);
        assert_eq!(line.mode, Some(TransportMode::SuburbanTrain));
        assert_eq!(line.label.as_deref(), Some("DART"));
    }

    #[test]
    fn dart_with_train_number_is_generic() {
        let raw = RawLine {
            train_name: Some("DART".to_owned()),
            train_num: Some("E102".to_owned()),
            mode_code: Some(1),
            ..RawLine::default()
        };
        let line = dublin().normalize_line(&raw);
        assert_eq!(line.label.as_deref(), Some("E102"));
        assert_eq!(line.mode, Some(TransportMode::SuburbanTrain));
    }

    #[test]
    fn generic_rail_collapses_to_unknown_mode() {
        let raw = RawLine {
            train_name: Some("Rail".to_owned()),
            symbol: Some("Rail".to_owned()),
            mode_code: Some(0),
            ..RawLine::default()
        };
        let line = dublin().normalize_line(&raw);
        assert_eq!(line.label.as_deref(), Some("Rail"));
        assert_eq!(line.mode, None);
    }

    #[test]
    fn intercity_without_number_is_fixed() {
        let raw = RawLine {
            train_type: Some("IC".to_owned()),
            long_name: Some("Dublin Heuston - Cork".to_owned()),
            ..RawLine::default()
        };
        let line = dublin().normalize_line(&raw);
        assert_eq!(line.label.as_deref(), Some("IC"));
        assert_eq!(line.mode, Some(TransportMode::RegionalTrain));
    }

    #[test]
    fn luas_line_keeps_colour_symbol() {
        let raw = RawLine {
            train_name: Some("LUAS".to_owned()),
            symbol: Some("Green".to_owned()),
            ..RawLine::default()
        };
        let line = dublin().normalize_line(&raw);
        assert_eq!(line.label.as_deref(), Some("Green"));
        assert_eq!(line.mode, Some(TransportMode::Tram));
    }

    #[test]
    fn declares_suggestions_and_departures_only() {
        let config = dublin();
        assert!(
            config
                .capabilities
                .supports(&[Capability::SuggestLocations, Capability::Departures])
        );
        assert!(!config.capabilities.supports(&[Capability::Trips]));
        assert!(matches!(
            adapter(AgencyPorts::default()),
            Err(ConfigError::MissingPort { .. })
        ));
    }

    #[test]
    fn unused_codes_are_absent() {
        let config = dublin();
        assert_eq!(config.mode_of(2), None);
        assert_eq!(config.mode_of(8), None);
        assert_eq!(config.mode_of(11), None);
        assert_eq!(config.mode_of(4), Some(TransportMode::Tram));
    }
}
