//! Plain-text rendering of registry lookups, one record per line.

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::Result;
use transito_core::{
    lines::RawLine,
    model::{AgencyId, CardinalDirection, TransportMode},
    plugin::{AgencyAdapter, AgencyRegistry},
    style::Style,
};

use crate::cli::Command;

const ABSENT: &str = "-";

/// Execute one subcommand against the registry, writing to `out`.
pub(crate) fn run<W: Write>(
    registry: &AgencyRegistry,
    command: Command,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Agencies => {
            for meta in registry.agencies() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    meta.id,
                    meta.name,
                    meta.region.as_str(),
                    meta.timezone
                )?;
            }
        }
        Command::Capabilities { agency } => {
            let adapter = lookup(registry, &agency)?;
            for capability in adapter.config().capabilities.iter() {
                let status = if adapter.capabilities().contains(capability) {
                    "served"
                } else {
                    "declared"
                };
                writeln!(out, "{capability}\t{status}")?;
            }
        }
        Command::Mode { agency, codes } => {
            let adapter = lookup(registry, &agency)?;
            if codes.is_empty() {
                for (code, slot) in adapter.config().modes.iter().enumerate() {
                    writeln!(out, "{code}\t{}", mode_name(slot))?;
                }
            } else {
                for code in codes {
                    writeln!(out, "{code}\t{}", mode_name(adapter.mode_of(code)))?;
                }
            }
        }
        Command::Mask { agency, modes } => {
            let adapter = lookup(registry, &agency)?;
            let modes: BTreeSet<TransportMode> = if modes.is_empty() {
                adapter.config().default_modes.clone()
            } else {
                modes.into_iter().collect()
            };
            let mask = adapter.config().modes.mask_of(&modes);
            writeln!(out, "{mask}\t{mask:#b}")?;
        }
        Command::Line { agency, raw } => {
            let adapter = lookup(registry, &agency)?;
            let line = adapter.normalize_line(&RawLine::from(raw));
            writeln!(out, "mode\t{}", mode_name(line.mode))?;
            writeln!(out, "label\t{}", line.label.as_deref().unwrap_or(ABSENT))?;
            writeln!(out, "style\t{}", describe_style(adapter.line_style(&line)))?;
        }
        Command::Position { agency, text } => {
            let adapter = lookup(registry, &agency)?;
            if let Some(position) = adapter.normalize_position(Some(&text)) {
                writeln!(out, "name\t{}", position.name)?;
                let direction = position
                    .direction
                    .as_ref()
                    .map_or(ABSENT, CardinalDirection::as_str);
                writeln!(out, "direction\t{direction}")?;
            }
        }
        Command::Style { agency, category } => {
            let adapter = lookup(registry, &agency)?;
            writeln!(out, "{}", describe_style(adapter.style_for(category)))?;
        }
    }
    Ok(())
}

fn lookup<'reg>(registry: &'reg AgencyRegistry, agency: &str) -> Result<&'reg AgencyAdapter> {
    Ok(registry.adapter(&AgencyId(agency.to_owned()))?)
}

fn mode_name(mode: Option<TransportMode>) -> &'static str {
    mode.map_or(ABSENT, TransportMode::name)
}

fn describe_style(style: &Style) -> String {
    let shape = format!("{:?}", style.shape).to_lowercase();
    match style.border {
        Some(border) => format!(
            "{shape} {} on {} border {border}",
            style.foreground, style.background
        ),
        None => format!("{shape} {} on {}", style.foreground, style.background),
    }
}
