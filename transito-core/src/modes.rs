//! Positional lookup from protocol-local product codes to canonical modes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::model::TransportMode;

/// Largest number of codes a table may hold; product bitmasks are 32 bits wide.
pub const MAX_MODE_CODES: usize = 32;

/// Marker for an unused slot in the serialized form.
const ABSENT_SLOT: &str = "-";

/// Agency-specific mapping from a bit position or product code to a mode.
///
/// Slots may be empty: the protocol defines the code but the canonical model
/// has no counterpart, or the agency never uses it. Both read back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ModeTable(Vec<Option<TransportMode>>);

impl ModeTable {
    /// Build a table from its slots, index 0 first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ModeTable`] when the table has more than
    /// [`MAX_MODE_CODES`] slots.
    pub fn new(slots: Vec<Option<TransportMode>>) -> Result<Self, ConfigError> {
        if slots.len() > MAX_MODE_CODES {
            return Err(ConfigError::ModeTable(format!(
                "{} slots exceed the maximum of {MAX_MODE_CODES}",
                slots.len()
            )));
        }
        Ok(Self(slots))
    }

    /// Mode for a code; codes beyond the table or in empty slots yield `None`.
    #[must_use]
    pub fn mode_of(&self, code: u32) -> Option<TransportMode> {
        let index = usize::try_from(code).ok()?;
        self.0.get(index).copied().flatten()
    }

    /// Decode a product bitmask, bit `i` standing for slot `i`.
    #[must_use]
    pub fn modes_of_mask(&self, bits: u32) -> BTreeSet<TransportMode> {
        self.0
            .iter()
            .enumerate()
            .filter(|(index, _)| bits & (1_u32 << index) != 0)
            .filter_map(|(_, slot)| *slot)
            .collect()
    }

    /// Encode a set of modes as the bitmask of every slot mapping into it.
    #[must_use]
    pub fn mask_of(&self, modes: &BTreeSet<TransportMode>) -> u32 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some_and(|mode| modes.contains(&mode)))
            .fold(0, |mask, (index, _)| mask | (1_u32 << index))
    }

    /// Number of slots, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slots in code order.
    pub fn iter(&self) -> impl Iterator<Item = Option<TransportMode>> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<String>> for ModeTable {
    type Error = ConfigError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        let slots = names
            .iter()
            .map(|name| {
                if name.trim() == ABSENT_SLOT {
                    Ok(None)
                } else {
                    name.parse::<TransportMode>()
                        .map(Some)
                        .map_err(|err| ConfigError::ModeTable(err.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        ModeTable::new(slots)
    }
}

impl From<ModeTable> for Vec<String> {
    fn from(table: ModeTable) -> Self {
        table
            .0
            .into_iter()
            .map(|slot| slot.map_or(ABSENT_SLOT, TransportMode::name).to_owned())
            .collect()
    }
}
