//! Rendering styles for line badges, keyed by a single category character.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::model::Line;

/// Opaque RGB color, written `#RRGGBB` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    /// Pure white.
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    /// Pure black.
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    /// Neutral gray used for unknown categories.
    pub const GRAY: Color = Color::rgb(0x80, 0x80, 0x80);

    /// Color from 8-bit channels.
    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Parse `#RRGGBB`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`] for anything else.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        text.strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.chars().all(|ch| ch.is_ascii_hexdigit()))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .map(Self)
            .ok_or_else(|| ConfigError::InvalidColor(text.to_owned()))
    }

    /// Packed `0xRRGGBB` value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{:06X}", self.value())
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Color::parse(&text)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Badge outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Plain rectangle.
    Rect,
    /// Rectangle with rounded corners.
    Rounded,
    /// Circle.
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Visual style of a line badge.
pub struct Style {
    /// Badge outline.
    pub shape: Shape,
    /// Fill color.
    pub background: Color,
    /// Text color.
    pub foreground: Color,
    /// Optional outline color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<Color>,
}

impl Style {
    /// Style without a border.
    #[must_use]
    pub const fn new(shape: Shape, background: Color, foreground: Color) -> Self {
        Self {
            shape,
            background,
            foreground,
            border: None,
        }
    }

    /// Same style with an outline.
    #[must_use]
    pub const fn with_border(mut self, border: Color) -> Self {
        self.border = Some(border);
        self
    }
}

/// Style for categories the table does not know: gray on white.
pub const FALLBACK_STYLE: Style =
    Style::new(Shape::Rect, Color::WHITE, Color::GRAY).with_border(Color::GRAY);

fn fallback_style() -> Style {
    FALLBACK_STYLE
}

static STANDARD: LazyLock<StyleTable> = LazyLock::new(|| {
    StyleTable::new([
        ('I', Style::new(Shape::Rect, Color::rgb(0xE3, 0x00, 0x0F), Color::WHITE)),
        ('R', Style::new(Shape::Rect, Color::rgb(0x7B, 0x7B, 0x7B), Color::WHITE)),
        ('S', Style::new(Shape::Rounded, Color::rgb(0x00, 0x8D, 0x4F), Color::WHITE)),
        ('U', Style::new(Shape::Rect, Color::rgb(0x00, 0x4B, 0x9B), Color::WHITE)),
        ('T', Style::new(Shape::Rect, Color::rgb(0xCC, 0x00, 0x00), Color::WHITE)),
        ('B', Style::new(Shape::Rounded, Color::rgb(0x99, 0x33, 0x99), Color::WHITE)),
        ('F', Style::new(Shape::Circle, Color::rgb(0x00, 0x80, 0xBA), Color::WHITE)),
        ('C', Style::new(Shape::Rect, Color::rgb(0x33, 0x33, 0x33), Color::WHITE)),
        (
            'P',
            Style::new(Shape::Rounded, Color::WHITE, Color::rgb(0x99, 0x33, 0x99))
                .with_border(Color::rgb(0x99, 0x33, 0x99)),
        ),
    ])
});

/// Category → style lookup with a fallback, so every lookup succeeds.
///
/// Agencies either use [`StyleTable::standard`] or bring a table of their own;
/// tables are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleTable {
    /// Style returned for unknown categories.
    #[serde(default = "fallback_style")]
    pub fallback: Style,
    /// Known categories.
    #[serde(default)]
    pub entries: BTreeMap<char, Style>,
}

impl StyleTable {
    /// Table from explicit entries, with the gray-on-white fallback.
    #[must_use]
    pub fn new<I: IntoIterator<Item = (char, Style)>>(entries: I) -> Self {
        Self {
            fallback: FALLBACK_STYLE,
            entries: entries.into_iter().collect(),
        }
    }

    /// Shared default table, keyed by transport mode code.
    #[must_use]
    pub fn standard() -> &'static StyleTable {
        &STANDARD
    }

    /// Style for a category; unknown categories get the fallback.
    #[must_use]
    pub fn style_for(&self, category: char) -> &Style {
        self.entries.get(&category).unwrap_or(&self.fallback)
    }

    /// Style for a line: the first character of its label when the table
    /// knows it, else the code of its mode, else the fallback.
    #[must_use]
    pub fn style_for_line(&self, line: &Line) -> &Style {
        line.label
            .as_deref()
            .and_then(|label| label.chars().next())
            .and_then(|category| self.entries.get(&category))
            .or_else(|| line.mode.and_then(|mode| self.entries.get(&mode.code())))
            .unwrap_or(&self.fallback)
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new([])
    }
}
