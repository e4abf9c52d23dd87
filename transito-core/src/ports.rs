//! Traits wire clients implement, the raw records they hand back, and the
//! errors a query can fail with.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use chrono::ParseError as ChronoParseError;
use reqwest::Error as ReqwestError;

use crate::config::ConfigError;
use crate::lines::RawLine;
use crate::model::{AgencyId, Capability, Coord, Location, TransportMode};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while answering a query.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Failed to parse a date from the backend response.
    #[error("Parse error: {0}")]
    Parse(#[from] ChronoParseError),
    /// The agency does not declare the requested capability.
    #[error("Agency {agency} does not support {capability}")]
    Unsupported {
        /// Agency the query was addressed to.
        agency: AgencyId,
        /// Capability that is missing.
        capability: Capability,
    },
    /// The registry could not resolve the agency.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Requested stop or location is unknown to the backend.
    #[error("Location not found")]
    LocationNotFound,
    /// Internal backend error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone)]
/// Query parameters for a free-text location search.
pub struct LocationSearch {
    /// Text typed by the user.
    pub text: String,
}

impl LocationSearch {
    /// Construct a new search query.
    #[must_use]
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    /// Check if the search query is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
/// Query parameters for trip planning.
pub struct TripRequest {
    /// Origin location id.
    pub from: String,
    /// Optional intermediate location id.
    pub via: Option<String>,
    /// Destination location id.
    pub to: String,
    /// Desired departure time, agency-local.
    pub time: NaiveDateTime,
    /// Allowed modes; empty means the agency defaults.
    pub modes: BTreeSet<TransportMode>,
    /// Product bitmask for `modes`, filled in from the agency's mode table.
    pub product_mask: u32,
}

impl TripRequest {
    /// Plain A to B request over the agency's default modes.
    #[must_use]
    pub fn new<F: Into<String>, T: Into<String>>(from: F, to: T, time: NaiveDateTime) -> Self {
        Self {
            from: from.into(),
            via: None,
            to: to.into(),
            time,
            modes: BTreeSet::new(),
            product_mask: 0,
        }
    }

    /// Same request routed through `via`.
    #[must_use]
    pub fn via<S: Into<String>>(mut self, via: S) -> Self {
        self.via = Some(via.into());
        self
    }

    /// Same request restricted to `modes`.
    #[must_use]
    pub fn with_modes<I: IntoIterator<Item = TransportMode>>(mut self, modes: I) -> Self {
        self.modes = modes.into_iter().collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Departure as extracted from a board response.
pub struct RawDeparture {
    /// Timetabled time.
    pub planned: NaiveDateTime,
    /// Real-time estimate.
    pub predicted: Option<NaiveDateTime>,
    /// Undecoded line fields.
    pub line: RawLine,
    /// Platform text as sent by the backend.
    pub position: Option<String>,
    /// Destination label.
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Trip leg as extracted from a trip response.
pub struct RawLeg {
    /// Undecoded line; `None` for walks.
    pub line: Option<RawLine>,
    /// Boarding location name.
    pub from: String,
    /// Alighting location name.
    pub to: String,
    /// Departure time.
    pub departure: NaiveDateTime,
    /// Arrival time.
    pub arrival: NaiveDateTime,
    /// Boarding platform text.
    pub departure_position: Option<String>,
    /// Alighting platform text.
    pub arrival_position: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Trip as extracted from a trip response.
pub struct RawTrip {
    /// Legs in travel order.
    pub legs: Vec<RawLeg>,
}

#[async_trait]
/// Wire-client backend for location lookups.
pub trait LocationPort: Send + Sync {
    /// Free-text suggestions.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend request fails.
    async fn suggest(
        &self,
        query: &LocationSearch,
        limit: usize,
    ) -> Result<Vec<Location>, PortError>;

    /// Stops within `max_distance` metres of `coord`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend request fails.
    async fn nearby(
        &self,
        coord: Coord,
        max_distance: u32,
        limit: usize,
    ) -> Result<Vec<Location>, PortError>;
}

#[async_trait]
/// Wire-client backend for departure boards.
pub trait DeparturePort: Send + Sync {
    /// Departures from a stop at or after `time`.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend request fails or rejects the stop.
    async fn departures(
        &self,
        stop_id: &str,
        time: NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<RawDeparture>, PortError>;
}

#[async_trait]
/// Wire-client backend for trip planning.
pub trait TripPort: Send + Sync {
    /// Trips matching the request.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the backend request fails.
    async fn trips(&self, request: &TripRequest) -> Result<Vec<RawTrip>, PortError>;
}
