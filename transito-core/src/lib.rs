//! Core types, normalization, and registry wiring for the transito transit
//! aggregator.

/// Agency configuration records and TOML loading.
pub mod config;
/// Line normalization rule chains.
pub mod lines;
/// Canonical domain models and identifiers shared by all agencies.
pub mod model;
/// Product code tables.
pub mod modes;
/// Registry of agency adapters and capability negotiation.
pub mod plugin;
/// Traits describing the wire-client interfaces.
pub mod ports;
/// Platform and bound descriptor normalization.
pub mod position;
/// High-level service facade used by clients.
pub mod service;
/// Line badge styles.
pub mod style;

pub use config::*;
pub use lines::*;
pub use model::*;
pub use modes::*;
pub use plugin::*;
pub use ports::*;
pub use position::*;
pub use service::*;
pub use style::*;
