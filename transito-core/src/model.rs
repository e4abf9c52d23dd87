//! Canonical data structures shared by every agency: identifiers, modes, lines,
//! positions, and the query results handed back to clients.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Built-in agencies shipped with transito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agencies {
    /// Transport for London.
    London,
    /// Transport for Ireland, Dublin area.
    Dublin,
    /// Transport for New South Wales.
    Sydney,
}

impl Agencies {
    /// Every built-in agency, in slug order.
    pub const ALL: [Agencies; 3] = [Agencies::Dublin, Agencies::London, Agencies::Sydney];
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Stable identifier for a transit agency known to transito.
pub struct AgencyId(pub String);

impl fmt::Display for Agencies {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Agencies::London => "london",
            Agencies::Dublin => "dublin",
            Agencies::Sydney => "sydney",
        };
        write!(formatter, "{slug}")
    }
}

impl From<Agencies> for AgencyId {
    fn from(agency: Agencies) -> Self {
        AgencyId(agency.to_string())
    }
}

impl fmt::Display for AgencyId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Operator cluster code used by one protocol family, e.g. `"tfl"`.
///
/// Opaque to the core; the value is only passed through to wire clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

impl Region {
    /// Validate and wrap a region code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRegion`] unless the code is a non-empty
    /// string of lowercase ASCII letters, digits, or hyphens.
    pub fn new<S: Into<String>>(code: S) -> Result<Self, ConfigError> {
        let code = code.into();
        let valid = !code.is_empty()
            && code
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if valid {
            Ok(Self(code))
        } else {
            Err(ConfigError::InvalidRegion(code))
        }
    }

    /// The region code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Region {
    type Error = ConfigError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Region::new(code)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing an agency and where it operates.
pub struct AgencyMeta {
    /// Unique identifier.
    pub id: AgencyId,
    /// Human-friendly name.
    pub name: String,
    /// Operator cluster code passed to the wire client.
    pub region: Region,
    /// IANA timezone the agency reports times in.
    pub timezone: String,
}

/// Canonical, agency-independent transport modes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Intercity and high-speed rail.
    HighSpeedTrain,
    /// Regional rail.
    RegionalTrain,
    /// Suburban rail / S-Bahn.
    SuburbanTrain,
    /// Metro and underground.
    Subway,
    /// Tram and light rail.
    Tram,
    /// Bus and coach.
    Bus,
    /// Ferry and boat services.
    Ferry,
    /// Cable cars, funiculars, and gondolas.
    Cablecar,
    /// Demand-responsive transport.
    OnDemand,
}

impl TransportMode {
    /// Every mode, in canonical order.
    pub const ALL: [TransportMode; 9] = [
        TransportMode::HighSpeedTrain,
        TransportMode::RegionalTrain,
        TransportMode::SuburbanTrain,
        TransportMode::Subway,
        TransportMode::Tram,
        TransportMode::Bus,
        TransportMode::Ferry,
        TransportMode::Cablecar,
        TransportMode::OnDemand,
    ];

    /// Single-character code, also used as the style category of a line.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            TransportMode::HighSpeedTrain => 'I',
            TransportMode::RegionalTrain => 'R',
            TransportMode::SuburbanTrain => 'S',
            TransportMode::Subway => 'U',
            TransportMode::Tram => 'T',
            TransportMode::Bus => 'B',
            TransportMode::Ferry => 'F',
            TransportMode::Cablecar => 'C',
            TransportMode::OnDemand => 'P',
        }
    }

    /// Inverse of [`TransportMode::code`].
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }

    /// The snake-case name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TransportMode::HighSpeedTrain => "high_speed_train",
            TransportMode::RegionalTrain => "regional_train",
            TransportMode::SuburbanTrain => "suburban_train",
            TransportMode::Subway => "subway",
            TransportMode::Tram => "tram",
            TransportMode::Bus => "bus",
            TransportMode::Ferry => "ferry",
            TransportMode::Cablecar => "cablecar",
            TransportMode::OnDemand => "on_demand",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Error returned when a transport mode name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport mode: {0}")]
pub struct UnknownTransportMode(pub String);

impl FromStr for TransportMode {
    type Err = UnknownTransportMode;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTransportMode(name.to_owned()))
    }
}

/// Query categories an adapter may support.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Free-text stop and address suggestions.
    SuggestLocations,
    /// Stops around a coordinate.
    NearbyLocations,
    /// Departure boards.
    Departures,
    /// Trip planning between two locations.
    Trips,
    /// Trip planning with an intermediate stop.
    TripsVia,
    /// Suggestions from a single combined input line.
    AutocompleteOneLine,
}

impl fmt::Display for Capability {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::SuggestLocations => "suggest_locations",
            Capability::NearbyLocations => "nearby_locations",
            Capability::Departures => "departures",
            Capability::Trips => "trips",
            Capability::TripsVia => "trips_via",
            Capability::AutocompleteOneLine => "autocomplete_one_line",
        };
        formatter.write_str(name)
    }
}

/// Fixed set of capabilities declared by an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// An empty set; adapters without a wire client declare nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether a single capability is declared.
    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// True iff every requested capability is declared.
    #[must_use]
    pub fn supports(&self, requested: &[Capability]) -> bool {
        requested.iter().all(|capability| self.0.contains(capability))
    }

    /// Iterate declared capabilities in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Number of declared capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[Capability; N]> for CapabilitySet {
    fn from(capabilities: [Capability; N]) -> Self {
        capabilities.into_iter().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Canonical line served by a departure or trip leg.
pub struct Line {
    /// Provider identifier of the line, if the wire format has one.
    pub id: Option<String>,
    /// Network or operator the line belongs to.
    pub network: Option<String>,
    /// Canonical mode; `None` when the agency data does not say.
    pub mode: Option<TransportMode>,
    /// Label shown to riders, e.g. `"S1"` or `"DART"`.
    pub label: Option<String>,
}

/// Compass letters parsed from a bound descriptor, e.g. `"NE"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardinalDirection(String);

impl CardinalDirection {
    /// Parse one or more letters from `{N, E, S, W}`, case-insensitive.
    #[must_use]
    pub fn parse(letters: &str) -> Option<Self> {
        let valid = !letters.is_empty()
            && letters
                .chars()
                .all(|ch| matches!(ch.to_ascii_uppercase(), 'N' | 'E' | 'S' | 'W'));
        valid.then(|| Self(letters.to_ascii_uppercase()))
    }

    /// Upper-case compass letters.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CardinalDirection {
    type Error = ConfigError;

    fn try_from(letters: String) -> Result<Self, Self::Error> {
        CardinalDirection::parse(&letters).ok_or(ConfigError::InvalidDirection(letters))
    }
}

impl From<CardinalDirection> for String {
    fn from(direction: CardinalDirection) -> Self {
        direction.0
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Platform, stand, or bound descriptor of a stop event.
pub struct Position {
    /// Text as reported by the agency.
    pub name: String,
    /// Direction of travel when the text encodes one.
    pub direction: Option<CardinalDirection>,
}

impl Position {
    /// Position without a parsed direction.
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            direction: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// WGS84 coordinate.
pub struct Coord {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Stop, station, or address returned by a location search.
pub struct Location {
    /// Identifier used by the agency in follow-up queries.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Locality the location belongs to.
    pub place: Option<String>,
    /// Coordinate when known.
    pub coord: Option<Coord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Single departure from a stop, in the agency's local time.
pub struct Departure {
    /// Timetabled departure time.
    pub planned: NaiveDateTime,
    /// Real-time estimate, if the agency provides one.
    pub predicted: Option<NaiveDateTime>,
    /// Line serving the departure.
    pub line: Line,
    /// Platform or stand.
    pub position: Option<Position>,
    /// Destination label.
    pub destination: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One leg of a planned trip.
pub struct Leg {
    /// Line ridden on this leg; `None` for walks and transfers.
    pub line: Option<Line>,
    /// Name of the boarding location.
    pub from: String,
    /// Name of the alighting location.
    pub to: String,
    /// Departure time at `from`.
    pub departure: NaiveDateTime,
    /// Arrival time at `to`.
    pub arrival: NaiveDateTime,
    /// Boarding platform.
    pub departure_position: Option<Position>,
    /// Alighting platform.
    pub arrival_position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Planned trip made of consecutive legs.
pub struct Trip {
    /// Legs in travel order.
    pub legs: Vec<Leg>,
}
