//! Agency configuration for Transport for London (EFA backend).

use transito_core::{
    config::{AgencyConfig, ConfigError},
    lines::{FieldMatch, LabelSource, LineMatch, LineOutcome, LineRule, ModeOutcome, RawField},
    model::{Agencies, Capability, CapabilitySet, Region, TransportMode},
    modes::ModeTable,
    plugin::{AgencyAdapter, AgencyPorts},
    position::PositionRule,
    style::{Color, Shape, Style, StyleTable},
};

const REGION: &str = "tfl";
const TIMEZONE: &str = "Europe/London";

/// Marker written in front of Underground line names.
const UNDERGROUND_MARKER: &str = "U";

const TFL_RED: Color = Color::rgb(0xDC, 0x24, 0x1F);
const TFL_BLUE: Color = Color::rgb(0x00, 0x19, 0xA8);

/// EFA `motType` codes as used by the TfL deployment.
fn mode_table() -> Result<ModeTable, ConfigError> {
    ModeTable::new(vec![
        Some(TransportMode::RegionalTrain), // 0 national rail
        Some(TransportMode::SuburbanTrain), // 1 Overground, Elizabeth line
        Some(TransportMode::Subway),        // 2 Underground
        Some(TransportMode::Subway),        // 3 DLR
        Some(TransportMode::Tram),          // 4 Tramlink
        Some(TransportMode::Bus),           // 5 bus
        None,                               // 6 regional bus, unused
        Some(TransportMode::Bus),           // 7 coach
        Some(TransportMode::Cablecar),      // 8 IFS Cloud Cable Car
        Some(TransportMode::Ferry),         // 9 river bus
        Some(TransportMode::OnDemand),      // 10 dial-a-ride
        None,                               // 11 other
    ])
}

fn line_rules() -> Vec<LineRule> {
    vec![
        LineRule::new(
            "underground",
            LineMatch::new()
                .train_name(FieldMatch::equals("Underground"))
                .train_type(FieldMatch::Absent),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::Subway),
                label: LabelSource::Prefixed {
                    marker: UNDERGROUND_MARKER.to_owned(),
                    field: RawField::Symbol,
                },
            },
        ),
        LineRule::new(
            "overground",
            LineMatch::new()
                .train_name(FieldMatch::equals("London Overground"))
                .train_num(FieldMatch::Absent),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::SuburbanTrain),
                label: LabelSource::Fixed("Overground".to_owned()),
            },
        ),
        LineRule::new(
            "elizabeth",
            LineMatch::new()
                .train_name(FieldMatch::equals("Elizabeth line"))
                .train_num(FieldMatch::Absent),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::SuburbanTrain),
                label: LabelSource::Fixed("Elizabeth".to_owned()),
            },
        ),
        LineRule::new(
            "dlr",
            LineMatch::new().train_name(FieldMatch::equals("DLR")),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::Subway),
                label: LabelSource::Fixed("DLR".to_owned()),
            },
        ),
    ]
}

fn style_table() -> StyleTable {
    StyleTable::new([
        (
            'U',
            Style::new(Shape::Circle, Color::WHITE, TFL_BLUE).with_border(TFL_RED),
        ),
        (
            'O',
            Style::new(Shape::Rounded, Color::rgb(0xEE, 0x7C, 0x0E), Color::WHITE),
        ),
        (
            'E',
            Style::new(Shape::Rounded, Color::rgb(0x60, 0x39, 0x9E), Color::WHITE),
        ),
        (
            'D',
            Style::new(Shape::Rounded, Color::rgb(0x00, 0xA4, 0xA7), Color::WHITE),
        ),
        ('B', Style::new(Shape::Rect, TFL_RED, Color::WHITE)),
        (
            'T',
            Style::new(Shape::Rect, Color::rgb(0x84, 0xB8, 0x17), Color::WHITE),
        ),
        (
            'R',
            Style::new(Shape::Rect, Color::rgb(0x7B, 0x7B, 0x7B), Color::WHITE),
        ),
        (
            'F',
            Style::new(Shape::Circle, Color::rgb(0x00, 0xA0, 0xE2), Color::WHITE),
        ),
        (
            'C',
            Style::new(Shape::Rect, Color::WHITE, TFL_RED).with_border(TFL_RED),
        ),
    ])
}

/// Static configuration for the London agency.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the static tables are malformed.
pub fn config() -> Result<AgencyConfig, ConfigError> {
    let mut config = AgencyConfig::new(
        Agencies::London.into(),
        "Transport for London",
        Region::new(REGION)?,
        TIMEZONE,
    );
    config.capabilities = CapabilitySet::from([
        Capability::SuggestLocations,
        Capability::NearbyLocations,
        Capability::Departures,
        Capability::Trips,
        Capability::TripsVia,
    ]);
    config.default_modes = TransportMode::ALL.into_iter().collect();
    config.modes = mode_table()?;
    config.line_rules = line_rules();
    config.position_rules = vec![PositionRule::Bound];
    config.styles = Some(style_table());
    Ok(config)
}

/// Build the adapter for the London agency on top of the given ports.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the configuration is malformed or a declared
/// capability has no port.
pub fn adapter(ports: AgencyPorts) -> Result<AgencyAdapter, ConfigError> {
    AgencyAdapter::new(config()?, ports)
}
