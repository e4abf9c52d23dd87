//! High-level service facade combining all agencies.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::model::{
    AgencyId, AgencyMeta, Capability, CapabilitySet, Coord, Departure, Leg, Location, Trip,
};
use crate::plugin::{AgencyAdapter, AgencyRegistry};
use crate::ports::{LocationSearch, PortError, RawDeparture, RawLeg, RawTrip, TripRequest};

/// Public entry point for location, departure, and trip queries.
pub struct TransitService {
    registry: Arc<AgencyRegistry>,
}

impl TransitService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<AgencyRegistry>) -> Self {
        Self { registry }
    }

    /// List all available agencies.
    #[must_use]
    pub fn agencies(&self) -> Vec<AgencyMeta> {
        self.registry.agencies()
    }

    /// Capabilities served for an agency.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Config`] if the agency is unknown.
    pub fn capabilities(&self, agency: &AgencyId) -> Result<&CapabilitySet, PortError> {
        Ok(self.registry.adapter(agency)?.capabilities())
    }

    /// Search for stops and addresses matching free text.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the agency is unknown, does not support
    /// location suggestions, or the backend call fails.
    pub async fn suggest_locations(
        &self,
        agency: &AgencyId,
        query: &LocationSearch,
        limit: usize,
    ) -> Result<Vec<Location>, PortError> {
        self.suggest_with(agency, Capability::SuggestLocations, query, limit)
            .await
    }

    /// Suggestions for a single combined input line ("street, city").
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the agency is unknown, does not support
    /// one-line autocompletion, or the backend call fails.
    pub async fn autocomplete(
        &self,
        agency: &AgencyId,
        query: &LocationSearch,
        limit: usize,
    ) -> Result<Vec<Location>, PortError> {
        self.suggest_with(agency, Capability::AutocompleteOneLine, query, limit)
            .await
    }

    async fn suggest_with(
        &self,
        agency: &AgencyId,
        capability: Capability,
        query: &LocationSearch,
        limit: usize,
    ) -> Result<Vec<Location>, PortError> {
        let port = self.registry.adapter(agency)?.location_port(capability)?;
        if limit == 0 || query.is_empty() {
            return Ok(Vec::new());
        }
        port.suggest(query, limit).await
    }

    /// Stops within `max_distance` metres of a coordinate.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the agency is unknown, does not support
    /// nearby searches, or the backend call fails.
    pub async fn nearby_locations(
        &self,
        agency: &AgencyId,
        coord: Coord,
        max_distance: u32,
        limit: usize,
    ) -> Result<Vec<Location>, PortError> {
        let port = self
            .registry
            .adapter(agency)?
            .location_port(Capability::NearbyLocations)?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        port.nearby(coord, max_distance, limit).await
    }

    /// Load the departure board of a stop.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the agency is unknown, does not support
    /// departures, or the backend rejects the stop.
    pub async fn departures(
        &self,
        agency: &AgencyId,
        stop_id: &str,
        time: NaiveDateTime,
        limit: usize,
    ) -> Result<Vec<Departure>, PortError> {
        let adapter = self.registry.adapter(agency)?;
        let port = adapter.departure_port()?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let raw = port.departures(stop_id, time, limit).await?;

        let mut departures: Vec<Departure> = raw
            .into_iter()
            .map(|departure| normalize_departure(adapter, departure))
            .collect();
        departures.sort_by_key(|departure| departure.predicted.unwrap_or(departure.planned));
        departures.truncate(limit);

        Ok(departures)
    }

    /// Plan trips; a request with `via` additionally needs [`Capability::TripsVia`].
    ///
    /// An empty mode set is replaced by the agency's default modes, and the
    /// product bitmask is derived from the agency's mode table.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the agency is unknown, does not support the
    /// requested kind of trip query, or the backend call fails.
    pub async fn trips(
        &self,
        agency: &AgencyId,
        mut request: TripRequest,
    ) -> Result<Vec<Trip>, PortError> {
        let adapter = self.registry.adapter(agency)?;
        let port = adapter.trip_port(Capability::Trips)?;
        if request.via.is_some() {
            adapter.require(Capability::TripsVia)?;
        }

        let config = adapter.config();
        if request.modes.is_empty() {
            request.modes.clone_from(&config.default_modes);
        }
        request.product_mask = config.modes.mask_of(&request.modes);

        let raw = port.trips(&request).await?;

        Ok(raw
            .into_iter()
            .map(|trip| normalize_trip(adapter, trip))
            .collect())
    }
}

fn normalize_departure(adapter: &AgencyAdapter, raw: RawDeparture) -> Departure {
    Departure {
        planned: raw.planned,
        predicted: raw.predicted,
        line: adapter.normalize_line(&raw.line),
        position: adapter.normalize_position(raw.position.as_deref()),
        destination: raw.destination,
    }
}

fn normalize_trip(adapter: &AgencyAdapter, raw: RawTrip) -> Trip {
    Trip {
        legs: raw
            .legs
            .into_iter()
            .map(|leg| normalize_leg(adapter, leg))
            .collect(),
    }
}

fn normalize_leg(adapter: &AgencyAdapter, raw: RawLeg) -> Leg {
    Leg {
        line: raw.line.as_ref().map(|line| adapter.normalize_line(line)),
        departure_position: adapter.normalize_position(raw.departure_position.as_deref()),
        arrival_position: adapter.normalize_position(raw.arrival_position.as_deref()),
        from: raw.from,
        to: raw.to,
        departure: raw.departure,
        arrival: raw.arrival,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::config::tests::bare_config;
    use crate::config::{AgencyConfig, ConfigError};
    use crate::lines::{
        FieldMatch, LabelSource, LineMatch, LineOutcome, LineRule, ModeOutcome, RawLine,
    };
    use crate::model::TransportMode;
    use crate::modes::ModeTable;
    use crate::plugin::AgencyPorts;
    use crate::ports::{DeparturePort, LocationPort, TripPort};
    use crate::position::PositionRule;

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
        last_request: Mutex<Option<TripRequest>>,
    }

    impl CountingBackend {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid time")
    }

    #[async_trait]
    impl LocationPort for CountingBackend {
        async fn suggest(
            &self,
            query: &LocationSearch,
            _limit: usize,
        ) -> Result<Vec<Location>, PortError> {
            self.touch();
            Ok(vec![Location {
                id: "stop-1".to_owned(),
                name: query.text.clone(),
                place: None,
                coord: None,
            }])
        }

        async fn nearby(
            &self,
            coord: Coord,
            _max_distance: u32,
            _limit: usize,
        ) -> Result<Vec<Location>, PortError> {
            self.touch();
            Ok(vec![Location {
                id: "stop-2".to_owned(),
                name: "Corner".to_owned(),
                place: None,
                coord: Some(coord),
            }])
        }
    }

    #[async_trait]
    impl DeparturePort for CountingBackend {
        async fn departures(
            &self,
            _stop_id: &str,
            _time: NaiveDateTime,
            _limit: usize,
        ) -> Result<Vec<RawDeparture>, PortError> {
            self.touch();
            Ok(vec![
                RawDeparture {
                    planned: at(9, 30),
                    predicted: None,
                    line: RawLine {
                        symbol: Some("B2".to_owned()),
                        mode_code: Some(1),
                        ..RawLine::default()
                    },
                    position: None,
                    destination: Some("Quay".to_owned()),
                },
                RawDeparture {
                    planned: at(9, 0),
                    predicted: Some(at(9, 5)),
                    line: RawLine {
                        train_name: Some("Express".to_owned()),
                        ..RawLine::default()
                    },
                    position: Some("S-bound".to_owned()),
                    destination: Some("Airport".to_owned()),
                },
            ])
        }
    }

    #[async_trait]
    impl TripPort for CountingBackend {
        async fn trips(&self, request: &TripRequest) -> Result<Vec<RawTrip>, PortError> {
            self.touch();
            if let Ok(mut last) = self.last_request.lock() {
                *last = Some(request.clone());
            }
            Ok(vec![RawTrip {
                legs: vec![
                    RawLeg {
                        line: None,
                        from: "Home".to_owned(),
                        to: "Quay".to_owned(),
                        departure: at(8, 0),
                        arrival: at(8, 10),
                        ..RawLeg::default()
                    },
                    RawLeg {
                        line: Some(RawLine {
                            symbol: Some("B2".to_owned()),
                            mode_code: Some(1),
                            ..RawLine::default()
                        }),
                        from: "Quay".to_owned(),
                        to: "Airport".to_owned(),
                        departure: at(8, 15),
                        arrival: at(8, 50),
                        departure_position: Some("E-bound".to_owned()),
                        arrival_position: Some("Stand 4".to_owned()),
                    },
                ],
            }])
        }
    }

    fn config(capabilities: &[Capability]) -> AgencyConfig {
        let mut config = bare_config("harbour");
        config.capabilities = capabilities.iter().copied().collect();
        config.default_modes = BTreeSet::from([TransportMode::Bus]);
        config.modes = ModeTable::new(vec![Some(TransportMode::Tram), Some(TransportMode::Bus)])
            .expect("valid table");
        config.line_rules = vec![LineRule::new(
            "express",
            LineMatch::new().train_name(FieldMatch::equals("Express")),
            LineOutcome {
                mode: ModeOutcome::Fixed(TransportMode::RegionalTrain),
                label: LabelSource::Fixed("X".to_owned()),
            },
        )];
        config.position_rules = vec![PositionRule::Bound];
        config
    }

    fn service(capabilities: &[Capability], backend: &Arc<CountingBackend>) -> TransitService {
        let ports = AgencyPorts {
            locations: Some(Arc::clone(backend) as Arc<dyn LocationPort>),
            departures: Some(Arc::clone(backend) as Arc<dyn DeparturePort>),
            trips: Some(Arc::clone(backend) as Arc<dyn TripPort>),
        };
        let adapter = AgencyAdapter::new(config(capabilities), ports).expect("valid adapter");
        let registry = AgencyRegistry::new(vec![adapter]).expect("valid registry");
        TransitService::new(Arc::new(registry))
    }

    fn harbour() -> AgencyId {
        AgencyId("harbour".to_owned())
    }

    #[tokio::test]
    async fn trips_rejected_before_backend_when_undeclared() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(
            &[Capability::SuggestLocations, Capability::Departures],
            &backend,
        );

        let err = service
            .trips(&harbour(), TripRequest::new("a", "b", at(8, 0)))
            .await
            .expect_err("trips are not declared");

        assert!(matches!(
            err,
            PortError::Unsupported {
                capability: Capability::Trips,
                ..
            }
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn via_requires_its_own_capability() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(&[Capability::Trips], &backend);

        let err = service
            .trips(&harbour(), TripRequest::new("a", "b", at(8, 0)).via("c"))
            .await
            .expect_err("via is not declared");
        assert!(matches!(
            err,
            PortError::Unsupported {
                capability: Capability::TripsVia,
                ..
            }
        ));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_agency_is_reported_as_configuration_error() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(&[Capability::Departures], &backend);

        let err = service
            .departures(&AgencyId("atlantis".to_owned()), "stop", at(9, 0), 10)
            .await
            .expect_err("unknown agency");
        assert!(matches!(err, PortError::Config(ConfigError::UnknownAgency(_))));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn departures_are_normalized_and_sorted() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(&[Capability::Departures], &backend);

        let departures = service
            .departures(&harbour(), "stop", at(9, 0), 10)
            .await
            .expect("departures");

        assert_eq!(backend.calls(), 1);
        assert_eq!(departures.len(), 2);

        let first = &departures[0];
        assert_eq!(first.line.label.as_deref(), Some("X"));
        assert_eq!(first.line.mode, Some(TransportMode::RegionalTrain));
        let direction = first
            .position
            .as_ref()
            .and_then(|position| position.direction.as_ref())
            .map(ToString::to_string);
        assert_eq!(direction.as_deref(), Some("S"));

        let second = &departures[1];
        assert_eq!(second.line.label.as_deref(), Some("B2"));
        assert_eq!(second.line.mode, Some(TransportMode::Bus));
        assert_eq!(second.position, None);
    }

    #[tokio::test]
    async fn zero_limit_skips_backend() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(&[Capability::Departures], &backend);

        let departures = service
            .departures(&harbour(), "stop", at(9, 0), 0)
            .await
            .expect("empty board");
        assert!(departures.is_empty());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn trips_fill_default_modes_and_normalize_legs() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(&[Capability::Trips, Capability::TripsVia], &backend);

        let trips = service
            .trips(&harbour(), TripRequest::new("home", "airport", at(8, 0)).via("quay"))
            .await
            .expect("trips");

        let sent = backend
            .last_request
            .lock()
            .ok()
            .and_then(|last| last.clone())
            .expect("request recorded");
        assert_eq!(sent.modes, BTreeSet::from([TransportMode::Bus]));
        assert_eq!(sent.product_mask, 0b10);

        let legs = &trips[0].legs;
        assert_eq!(legs[0].line, None);
        let ride = legs[1].line.as_ref().expect("ridden leg");
        assert_eq!(ride.label.as_deref(), Some("B2"));
        assert_eq!(ride.mode, Some(TransportMode::Bus));
        assert_eq!(
            legs[1]
                .departure_position
                .as_ref()
                .and_then(|position| position.direction.as_ref())
                .map(ToString::to_string)
                .as_deref(),
            Some("E")
        );
        assert_eq!(
            legs[1].arrival_position.as_ref().map(|position| position.name.as_str()),
            Some("Stand 4")
        );
    }

    #[tokio::test]
    async fn suggestions_and_autocomplete_are_gated_separately() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(&[Capability::SuggestLocations], &backend);
        let query = LocationSearch::new("Quay");

        let found = service
            .suggest_locations(&harbour(), &query, 5)
            .await
            .expect("suggestions");
        assert_eq!(found[0].name, "Quay");

        let err = service
            .autocomplete(&harbour(), &query, 5)
            .await
            .expect_err("one-line autocomplete not declared");
        assert!(matches!(
            err,
            PortError::Unsupported {
                capability: Capability::AutocompleteOneLine,
                ..
            }
        ));

        let empty = service
            .suggest_locations(&harbour(), &LocationSearch::new(" "), 5)
            .await
            .expect("empty query");
        assert!(empty.is_empty());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn nearby_passes_coordinate_through() {
        let backend = Arc::new(CountingBackend::default());
        let service = service(&[Capability::NearbyLocations], &backend);
        let coord = Coord {
            lat: 53.35,
            lon: -6.26,
        };

        let found = service
            .nearby_locations(&harbour(), coord, 500, 3)
            .await
            .expect("nearby");
        assert_eq!(found[0].coord, Some(coord));
        assert!(
            service
                .capabilities(&harbour())
                .expect("known")
                .supports(&[Capability::NearbyLocations])
        );
    }
}
