//! Line normalization: agency rule chains ending in a generic decoder.
//!
//! Each agency carries an ordered list of [`LineRule`]s. The first rule whose
//! [`LineMatch`] accepts a [`RawLine`] decides the canonical [`Line`]; when
//! none does, [`generic_line`] derives the label from the most specific field
//! available and the mode from the agency's [`ModeTable`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::AgencyConfig;
use crate::model::{Line, TransportMode};
use crate::modes::ModeTable;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Line descriptor as extracted from a wire response, before normalization.
pub struct RawLine {
    /// Provider identifier of the line.
    pub id: Option<String>,
    /// Network or operator code.
    pub network: Option<String>,
    /// Protocol-local product code, looked up in the agency's mode table.
    pub mode_code: Option<u32>,
    /// Line symbol, e.g. `"S1"`.
    pub symbol: Option<String>,
    /// Short display name.
    pub short_name: Option<String>,
    /// Long display name.
    pub long_name: Option<String>,
    /// Train category, e.g. `"ICE"`.
    pub train_type: Option<String>,
    /// Train number.
    pub train_num: Option<String>,
    /// Train or service branding, e.g. `"DART"`.
    pub train_name: Option<String>,
}

impl RawLine {
    /// Value of a text field exactly as reported; empty values count as absent.
    #[must_use]
    pub fn field(&self, field: RawField) -> Option<&str> {
        let value = match field {
            RawField::Symbol => &self.symbol,
            RawField::ShortName => &self.short_name,
            RawField::LongName => &self.long_name,
            RawField::TrainType => &self.train_type,
            RawField::TrainNum => &self.train_num,
            RawField::TrainName => &self.train_name,
        };
        value.as_deref().filter(|text| !text.is_empty())
    }
}

/// Text fields of a [`RawLine`] that rules can inspect or copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawField {
    /// [`RawLine::symbol`].
    Symbol,
    /// [`RawLine::short_name`].
    ShortName,
    /// [`RawLine::long_name`].
    LongName,
    /// [`RawLine::train_type`].
    TrainType,
    /// [`RawLine::train_num`].
    TrainNum,
    /// [`RawLine::train_name`].
    TrainName,
}

/// Condition on one text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMatch {
    /// Field is not inspected.
    #[default]
    Any,
    /// Field must be missing or empty.
    Absent,
    /// Field must carry a value.
    Present,
    /// Field must equal the literal exactly, after trimming.
    Equals(String),
}

impl FieldMatch {
    /// Shorthand for [`FieldMatch::Equals`].
    #[must_use]
    pub fn equals<S: Into<String>>(literal: S) -> Self {
        FieldMatch::Equals(literal.into())
    }

    fn matches(&self, value: Option<&str>) -> bool {
        match self {
            FieldMatch::Any => true,
            FieldMatch::Absent => value.is_none(),
            FieldMatch::Present => value.is_some(),
            FieldMatch::Equals(literal) => value.map(str::trim) == Some(literal.as_str()),
        }
    }

    fn is_any(&self) -> bool {
        *self == FieldMatch::Any
    }
}

/// Condition on the numeric product code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeMatch {
    /// Code is not inspected.
    #[default]
    Any,
    /// No code was supplied.
    Absent,
    /// Some code was supplied.
    Present,
    /// Exactly this code was supplied.
    Equals(u32),
}

impl CodeMatch {
    fn matches(self, value: Option<u32>) -> bool {
        match self {
            CodeMatch::Any => true,
            CodeMatch::Absent => value.is_none(),
            CodeMatch::Present => value.is_some(),
            CodeMatch::Equals(code) => value == Some(code),
        }
    }
}

/// Predicate half of a [`LineRule`]: every listed condition must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineMatch {
    /// Condition on [`RawLine::mode_code`].
    #[serde(skip_serializing_if = "is_any_code")]
    pub mode_code: CodeMatch,
    /// Condition on [`RawLine::symbol`].
    #[serde(skip_serializing_if = "FieldMatch::is_any")]
    pub symbol: FieldMatch,
    /// Condition on [`RawLine::short_name`].
    #[serde(skip_serializing_if = "FieldMatch::is_any")]
    pub short_name: FieldMatch,
    /// Condition on [`RawLine::long_name`].
    #[serde(skip_serializing_if = "FieldMatch::is_any")]
    pub long_name: FieldMatch,
    /// Condition on [`RawLine::train_type`].
    #[serde(skip_serializing_if = "FieldMatch::is_any")]
    pub train_type: FieldMatch,
    /// Condition on [`RawLine::train_num`].
    #[serde(skip_serializing_if = "FieldMatch::is_any")]
    pub train_num: FieldMatch,
    /// Condition on [`RawLine::train_name`].
    #[serde(skip_serializing_if = "FieldMatch::is_any")]
    pub train_name: FieldMatch,
}

fn is_any_code(code: &CodeMatch) -> bool {
    *code == CodeMatch::Any
}

impl LineMatch {
    /// A predicate accepting every input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the product code.
    #[must_use]
    pub fn mode_code(mut self, condition: CodeMatch) -> Self {
        self.mode_code = condition;
        self
    }

    /// Constrain the symbol.
    #[must_use]
    pub fn symbol(mut self, condition: FieldMatch) -> Self {
        self.symbol = condition;
        self
    }

    /// Constrain the short name.
    #[must_use]
    pub fn short_name(mut self, condition: FieldMatch) -> Self {
        self.short_name = condition;
        self
    }

    /// Constrain the long name.
    #[must_use]
    pub fn long_name(mut self, condition: FieldMatch) -> Self {
        self.long_name = condition;
        self
    }

    /// Constrain the train type.
    #[must_use]
    pub fn train_type(mut self, condition: FieldMatch) -> Self {
        self.train_type = condition;
        self
    }

    /// Constrain the train number.
    #[must_use]
    pub fn train_num(mut self, condition: FieldMatch) -> Self {
        self.train_num = condition;
        self
    }

    /// Constrain the train name.
    #[must_use]
    pub fn train_name(mut self, condition: FieldMatch) -> Self {
        self.train_name = condition;
        self
    }

    /// Whether every condition holds for `raw`.
    #[must_use]
    pub fn matches(&self, raw: &RawLine) -> bool {
        self.mode_code.matches(raw.mode_code)
            && self.symbol.matches(raw.field(RawField::Symbol))
            && self.short_name.matches(raw.field(RawField::ShortName))
            && self.long_name.matches(raw.field(RawField::LongName))
            && self.train_type.matches(raw.field(RawField::TrainType))
            && self.train_num.matches(raw.field(RawField::TrainNum))
            && self.train_name.matches(raw.field(RawField::TrainName))
    }
}

/// How a matching rule decides the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeOutcome {
    /// Always this mode.
    Fixed(TransportMode),
    /// Mode is deliberately left unknown.
    Unknown,
    /// Look the product code up in the agency's mode table.
    FromCode,
}

/// How a matching rule builds the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// Always this literal.
    Fixed(String),
    /// Copy of a raw field.
    Field(RawField),
    /// A marker written in front of a raw field.
    Prefixed {
        /// Literal placed before the field value.
        marker: String,
        /// Field supplying the rest of the label.
        field: RawField,
    },
}

impl LabelSource {
    fn render(&self, raw: &RawLine) -> Option<String> {
        match self {
            LabelSource::Fixed(label) => Some(label.clone()),
            LabelSource::Field(field) => raw.field(*field).map(str::to_owned),
            LabelSource::Prefixed { marker, field } => {
                raw.field(*field).map(|value| format!("{marker}{value}"))
            }
        }
    }
}

/// Result half of a [`LineRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineOutcome {
    /// Mode of the resulting line.
    pub mode: ModeOutcome,
    /// Label of the resulting line.
    pub label: LabelSource,
}

/// One agency-specific special case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineRule {
    /// Short name used in logs.
    pub name: String,
    /// Conditions the raw line must satisfy.
    #[serde(default)]
    pub when: LineMatch,
    /// Line produced on a match.
    pub then: LineOutcome,
}

impl LineRule {
    /// Build a rule from its parts.
    #[must_use]
    pub fn new<S: Into<String>>(name: S, when: LineMatch, then: LineOutcome) -> Self {
        Self {
            name: name.into(),
            when,
            then,
        }
    }

    /// Canonical line if this rule fires.
    ///
    /// A rule whose label source field is missing does not fire, so the chain
    /// moves on instead of producing an unlabeled line.
    #[must_use]
    pub fn apply(&self, raw: &RawLine, modes: &ModeTable) -> Option<Line> {
        if !self.when.matches(raw) {
            return None;
        }
        let label = self.then.label.render(raw)?;
        let mode = match self.then.mode {
            ModeOutcome::Fixed(mode) => Some(mode),
            ModeOutcome::Unknown => None,
            ModeOutcome::FromCode => raw.mode_code.and_then(|code| modes.mode_of(code)),
        };
        Some(Line {
            id: raw.id.clone(),
            network: raw.network.clone(),
            mode,
            label: Some(label),
        })
    }
}

/// Normalize a raw line with the agency's rule chain.
#[must_use]
pub fn normalize_line(config: &AgencyConfig, raw: &RawLine) -> Line {
    for rule in &config.line_rules {
        if let Some(line) = rule.apply(raw, &config.modes) {
            trace!(agency = %config.id, rule = %rule.name, "line rule matched");
            return line;
        }
    }
    generic_line(raw, &config.modes)
}

/// Terminal rule of every chain.
///
/// Label preference: symbol, short name, long name, then train type and
/// number, then train name.
#[must_use]
pub fn generic_line(raw: &RawLine, modes: &ModeTable) -> Line {
    let label = raw
        .field(RawField::Symbol)
        .or_else(|| raw.field(RawField::ShortName))
        .or_else(|| raw.field(RawField::LongName))
        .map(str::to_owned)
        .or_else(|| train_label(raw));

    Line {
        id: raw.id.clone(),
        network: raw.network.clone(),
        mode: raw.mode_code.and_then(|code| modes.mode_of(code)),
        label,
    }
}

fn train_label(raw: &RawLine) -> Option<String> {
    match (raw.field(RawField::TrainType), raw.field(RawField::TrainNum)) {
        (Some(train_type), Some(train_num)) => Some(format!("{train_type} {train_num}")),
        (Some(only), None) | (None, Some(only)) => Some(only.to_owned()),
        (None, None) => raw.field(RawField::TrainName).map(str::to_owned),
    }
}
