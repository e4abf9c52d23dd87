use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use transito_core::{lines::RawLine, model::TransportMode};

#[derive(Parser, Debug)]
#[command(name = "transito")]
#[command(about = "Inspect transit agency configurations and normalize raw codes")]
#[command(version)]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) command: Command,

    /// Extra agencies to register, as a TOML file of `[[agency]]` tables
    #[arg(short, long, global = true, env = "TRANSITO_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List registered agencies
    Agencies,

    /// Show the capabilities an agency declares
    Capabilities {
        /// Agency identifier, e.g. `london`
        agency: String,
    },

    /// Look up product codes in an agency's mode table
    Mode {
        /// Agency identifier
        agency: String,

        /// Product codes to look up; prints the whole table when empty
        codes: Vec<u32>,
    },

    /// Compute the product bitmask an agency sends for a set of modes
    Mask {
        /// Agency identifier
        agency: String,

        /// Mode names, e.g. `bus subway`; defaults to the agency's default modes
        modes: Vec<TransportMode>,
    },

    /// Normalize a raw line descriptor
    Line {
        /// Agency identifier
        agency: String,

        #[command(flatten)]
        raw: RawLineArgs,
    },

    /// Normalize a raw platform or bound descriptor
    Position {
        /// Agency identifier
        agency: String,

        /// Text as reported by the agency
        text: String,
    },

    /// Show the badge style for a category character
    Style {
        /// Agency identifier
        agency: String,

        /// Category character, e.g. `U`
        category: char,
    },
}

/// Fields of a raw line descriptor.
#[derive(ClapArgs, Debug, Default)]
pub(crate) struct RawLineArgs {
    /// Protocol-local product code
    #[arg(long)]
    pub(crate) mode_code: Option<u32>,

    /// Line symbol
    #[arg(long)]
    pub(crate) symbol: Option<String>,

    /// Short display name
    #[arg(long)]
    pub(crate) short_name: Option<String>,

    /// Long display name
    #[arg(long)]
    pub(crate) long_name: Option<String>,

    /// Train category
    #[arg(long)]
    pub(crate) train_type: Option<String>,

    /// Train number
    #[arg(long)]
    pub(crate) train_num: Option<String>,

    /// Train or service branding
    #[arg(long)]
    pub(crate) train_name: Option<String>,
}

impl From<RawLineArgs> for RawLine {
    fn from(args: RawLineArgs) -> Self {
        RawLine {
            id: None,
            network: None,
            mode_code: args.mode_code,
            symbol: args.symbol,
            short_name: args.short_name,
            long_name: args.long_name,
            train_type: args.train_type,
            train_num: args.train_num,
            train_name: args.train_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_flags() {
        let args = Args::try_parse_from([
            "transito",
            "line",
            "london",
            "--train-name",
            "Underground",
            "--symbol",
            "Victoria",
        ])
        .expect("valid arguments");
        let Command::Line { agency, raw } = args.command else {
            panic!("expected line command");
        };
        assert_eq!(agency, "london");
        let raw = RawLine::from(raw);
        assert_eq!(raw.train_name.as_deref(), Some("Underground"));
        assert_eq!(raw.symbol.as_deref(), Some("Victoria"));
        assert_eq!(raw.mode_code, None);
    }

    #[test]
    fn parses_mode_names() {
        let args = Args::try_parse_from(["transito", "mask", "sydney", "bus", "Ferry"])
            .expect("valid arguments");
        let Command::Mask { modes, .. } = args.command else {
            panic!("expected mask command");
        };
        assert_eq!(modes, vec![TransportMode::Bus, TransportMode::Ferry]);
    }

    #[test]
    fn rejects_unknown_mode_name() {
        assert!(Args::try_parse_from(["transito", "mask", "sydney", "hovercraft"]).is_err());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let args = Args::try_parse_from(["transito", "agencies", "-v", "--config", "extra.toml"])
            .expect("valid arguments");
        assert!(args.verbose);
        assert_eq!(args.config, Some(PathBuf::from("extra.toml")));
    }
}
