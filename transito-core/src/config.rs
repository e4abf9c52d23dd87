//! Per-agency configuration records and TOML loading.
//!
//! Built-in agencies construct their [`AgencyConfig`] in code; additional
//! agencies can be described in a TOML file made of `[[agency]]` tables.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lines::{self, LineRule, RawLine};
use crate::model::{
    AgencyId, AgencyMeta, Capability, CapabilitySet, Line, Position, Region, TransportMode,
};
use crate::modes::ModeTable;
use crate::position::{self, PositionRule};
use crate::style::{Style, StyleTable};

#[derive(thiserror::Error, Debug)]
/// Problems found while assembling the agency registry. Fatal at startup.
pub enum ConfigError {
    /// Two adapters claim the same identifier.
    #[error("Duplicate agency: {0}")]
    DuplicateAgency(AgencyId),
    /// No adapter is registered under the identifier.
    #[error("Unknown agency: {0}")]
    UnknownAgency(AgencyId),
    /// A declared capability has no port to serve it.
    #[error("Agency {agency} declares {capability} but has no port for it")]
    MissingPort {
        /// Offending agency.
        agency: AgencyId,
        /// Capability without a port.
        capability: Capability,
    },
    /// Mode table is malformed.
    #[error("Invalid mode table: {0}")]
    ModeTable(String),
    /// Region code is malformed.
    #[error("Invalid region: {0:?}")]
    InvalidRegion(String),
    /// Compass letters are malformed.
    #[error("Invalid direction: {0:?}")]
    InvalidDirection(String),
    /// Color literal is malformed.
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
    /// Configuration file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was being read.
        path: String,
        /// Underlying error.
        source: io::Error,
    },
    /// Configuration file is not valid TOML or has the wrong shape.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Immutable description of one agency: tables, rule chains, capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgencyConfig {
    /// Unique identifier.
    pub id: AgencyId,
    /// Human-friendly name.
    pub name: String,
    /// Operator cluster code handed to the wire client.
    pub region: Region,
    /// IANA timezone name of reported times.
    pub timezone: String,
    /// Modes requested when a trip query names none.
    #[serde(default)]
    pub default_modes: BTreeSet<TransportMode>,
    /// Query types the agency's backend can answer.
    #[serde(default)]
    pub capabilities: CapabilitySet,
    /// Product code lookup.
    #[serde(default)]
    pub modes: ModeTable,
    /// Line special cases, tried in order before the generic rule.
    #[serde(default)]
    pub line_rules: Vec<LineRule>,
    /// Position special cases, tried in order before the generic fallback.
    #[serde(default)]
    pub position_rules: Vec<PositionRule>,
    /// Agency-owned style table replacing the standard one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleTable>,
}

impl AgencyConfig {
    /// Minimal configuration: no capabilities, tables, or special cases.
    #[must_use]
    pub fn new<S: Into<String>, T: Into<String>>(
        id: AgencyId,
        name: S,
        region: Region,
        timezone: T,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            region,
            timezone: timezone.into(),
            default_modes: BTreeSet::new(),
            capabilities: CapabilitySet::empty(),
            modes: ModeTable::default(),
            line_rules: Vec::new(),
            position_rules: Vec::new(),
            styles: None,
        }
    }

    /// Metadata shown to clients.
    #[must_use]
    pub fn meta(&self) -> AgencyMeta {
        AgencyMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            region: self.region.clone(),
            timezone: self.timezone.clone(),
        }
    }

    /// Mode for a product code.
    #[must_use]
    pub fn mode_of(&self, code: u32) -> Option<TransportMode> {
        self.modes.mode_of(code)
    }

    /// See [`lines::normalize_line`].
    #[must_use]
    pub fn normalize_line(&self, raw: &RawLine) -> Line {
        lines::normalize_line(self, raw)
    }

    /// See [`position::normalize_position`].
    #[must_use]
    pub fn normalize_position(&self, raw: Option<&str>) -> Option<Position> {
        position::normalize_position(self, raw)
    }

    /// Style table in effect: the agency's own, or the standard one.
    #[must_use]
    pub fn style_table(&self) -> &StyleTable {
        self.styles.as_ref().unwrap_or_else(|| StyleTable::standard())
    }

    /// Style for a category character.
    #[must_use]
    pub fn style_for(&self, category: char) -> &Style {
        self.style_table().style_for(category)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgencyFile {
    #[serde(default)]
    agency: Vec<AgencyConfig>,
}

/// Parse agency configurations from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the text is not valid TOML or a value
/// fails validation (region, colors, mode names, table size).
pub fn parse_agencies(source: &str) -> Result<Vec<AgencyConfig>, ConfigError> {
    let file: AgencyFile = toml::from_str(source)?;
    Ok(file.agency)
}

/// Load agency configurations from a TOML file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::Parse`] when its content is invalid.
pub fn load_agencies(path: &Path) -> Result<Vec<AgencyConfig>, ConfigError> {
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let agencies = parse_agencies(&source)?;
    debug!(path = %path.display(), count = agencies.len(), "loaded agency configuration");
    Ok(agencies)
}
