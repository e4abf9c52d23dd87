//! Registry of agency adapters and capability negotiation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{AgencyConfig, ConfigError};
use crate::lines::RawLine;
use crate::model::{
    AgencyId, AgencyMeta, Capability, CapabilitySet, Line, Position, TransportMode,
};
use crate::ports::{DeparturePort, LocationPort, PortError, TripPort};
use crate::style::{Style, StyleTable};

/// Wire-client ports backing an adapter. Unused ports may stay `None`.
#[derive(Clone, Default)]
pub struct AgencyPorts {
    /// Location search backend.
    pub locations: Option<Arc<dyn LocationPort>>,
    /// Departure board backend.
    pub departures: Option<Arc<dyn DeparturePort>>,
    /// Trip planning backend.
    pub trips: Option<Arc<dyn TripPort>>,
}

impl AgencyPorts {
    fn serves(&self, capability: Capability) -> bool {
        match capability {
            Capability::SuggestLocations
            | Capability::NearbyLocations
            | Capability::AutocompleteOneLine => self.locations.is_some(),
            Capability::Departures => self.departures.is_some(),
            Capability::Trips | Capability::TripsVia => self.trips.is_some(),
        }
    }
}

impl fmt::Debug for AgencyPorts {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AgencyPorts")
            .field("locations", &self.locations.is_some())
            .field("departures", &self.departures.is_some())
            .field("trips", &self.trips.is_some())
            .finish()
    }
}

/// Configured agency: immutable configuration plus the ports serving it.
///
/// Capabilities are fixed when the adapter is built. Operations check them
/// before any port is touched.
#[derive(Debug, Clone)]
pub struct AgencyAdapter {
    config: Arc<AgencyConfig>,
    capabilities: CapabilitySet,
    ports: AgencyPorts,
}

impl AgencyAdapter {
    /// Bind a configuration to its ports.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingPort`] when a declared capability has no
    /// port that could serve it.
    pub fn new(config: AgencyConfig, ports: AgencyPorts) -> Result<Self, ConfigError> {
        if let Some(capability) = config
            .capabilities
            .iter()
            .find(|capability| !ports.serves(*capability))
        {
            return Err(ConfigError::MissingPort {
                agency: config.id.clone(),
                capability,
            });
        }
        Ok(Self {
            capabilities: config.capabilities.clone(),
            config: Arc::new(config),
            ports,
        })
    }

    /// Adapter without a wire client: normalization only, no capabilities.
    #[must_use]
    pub fn detached(config: AgencyConfig) -> Self {
        debug!(agency = %config.id, "adapter built without wire client");
        Self {
            config: Arc::new(config),
            capabilities: CapabilitySet::empty(),
            ports: AgencyPorts::default(),
        }
    }

    /// Agency identifier.
    #[must_use]
    pub fn id(&self) -> &AgencyId {
        &self.config.id
    }

    /// Metadata shown to clients.
    #[must_use]
    pub fn meta(&self) -> AgencyMeta {
        self.config.meta()
    }

    /// Shared configuration record.
    #[must_use]
    pub fn config(&self) -> &Arc<AgencyConfig> {
        &self.config
    }

    /// Capabilities this adapter serves.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// True iff every requested capability is served.
    #[must_use]
    pub fn supports(&self, requested: &[Capability]) -> bool {
        self.capabilities.supports(requested)
    }

    /// Reject a query for a capability the adapter does not serve.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unsupported`] naming the missing capability.
    pub fn require(&self, capability: Capability) -> Result<(), PortError> {
        if self.capabilities.contains(capability) {
            Ok(())
        } else {
            warn!(agency = %self.config.id, %capability, "rejected unsupported query");
            Err(PortError::Unsupported {
                agency: self.config.id.clone(),
                capability,
            })
        }
    }

    /// Location port, gated on `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unsupported`] when the capability is not served.
    pub fn location_port(&self, capability: Capability) -> Result<&dyn LocationPort, PortError> {
        self.gate(capability, self.ports.locations.as_deref())
    }

    /// Departure port, gated on [`Capability::Departures`].
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unsupported`] when departures are not served.
    pub fn departure_port(&self) -> Result<&dyn DeparturePort, PortError> {
        self.gate(Capability::Departures, self.ports.departures.as_deref())
    }

    /// Trip port, gated on `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Unsupported`] when the capability is not served.
    pub fn trip_port(&self, capability: Capability) -> Result<&dyn TripPort, PortError> {
        self.gate(capability, self.ports.trips.as_deref())
    }

    fn gate<'port, P: ?Sized>(
        &self,
        capability: Capability,
        port: Option<&'port P>,
    ) -> Result<&'port P, PortError> {
        self.require(capability)?;
        port.ok_or_else(|| PortError::Unsupported {
            agency: self.config.id.clone(),
            capability,
        })
    }

    /// Mode for a product code.
    #[must_use]
    pub fn mode_of(&self, code: u32) -> Option<TransportMode> {
        self.config.mode_of(code)
    }

    /// Canonical line for raw line fields.
    #[must_use]
    pub fn normalize_line(&self, raw: &RawLine) -> Line {
        self.config.normalize_line(raw)
    }

    /// Canonical position for raw platform text.
    #[must_use]
    pub fn normalize_position(&self, raw: Option<&str>) -> Option<Position> {
        self.config.normalize_position(raw)
    }

    /// Style for a category character.
    #[must_use]
    pub fn style_for(&self, category: char) -> &Style {
        self.config.style_for(category)
    }

    /// Style for a line; see [`StyleTable::style_for_line`].
    #[must_use]
    pub fn line_style(&self, line: &Line) -> &Style {
        self.config.style_table().style_for_line(line)
    }
}

/// Registry that resolves adapters by agency identifier.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug)]
pub struct AgencyRegistry {
    adapters: HashMap<AgencyId, AgencyAdapter>,
}

impl AgencyRegistry {
    /// Build a registry from the provided adapters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateAgency`] when two adapters share an id.
    pub fn new(adapters: Vec<AgencyAdapter>) -> Result<Self, ConfigError> {
        let mut map = HashMap::with_capacity(adapters.len());
        for adapter in adapters {
            match map.entry(adapter.id().clone()) {
                Entry::Occupied(entry) => {
                    return Err(ConfigError::DuplicateAgency(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(adapter);
                }
            }
        }
        debug!(agencies = map.len(), "agency registry built");
        Ok(Self { adapters: map })
    }

    /// Metadata for all registered agencies, sorted by id.
    #[must_use]
    pub fn agencies(&self) -> Vec<AgencyMeta> {
        let mut agencies: Vec<AgencyMeta> = self.agencies_iter().map(AgencyAdapter::meta).collect();
        agencies.sort_by(|left, right| left.id.cmp(&right.id));
        agencies
    }

    /// Iterator over registered adapters, in no particular order.
    pub fn agencies_iter(&self) -> impl Iterator<Item = &AgencyAdapter> {
        self.adapters.values()
    }

    /// Look up the adapter for an agency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownAgency`] when no adapter is registered.
    pub fn adapter(&self, agency: &AgencyId) -> Result<&AgencyAdapter, ConfigError> {
        self.adapters
            .get(agency)
            .ok_or_else(|| ConfigError::UnknownAgency(agency.clone()))
    }

    /// Check at startup that every enabled agency is registered.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownAgency`] for the first missing id.
    pub fn require(&self, agencies: &[AgencyId]) -> Result<(), ConfigError> {
        agencies
            .iter()
            .try_for_each(|agency| self.adapter(agency).map(|_| ()))
    }

    /// Number of registered agencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no agency is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
