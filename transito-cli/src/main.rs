//! Command-line tool that loads the Transito agency registry and answers
//! normalization lookups against it.

mod cli;
mod report;

use std::env;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use transito_core::{
    config::{AgencyConfig, ConfigError, load_agencies},
    model::Agencies,
    plugin::{AgencyAdapter, AgencyRegistry},
};
use transito_provider_dublin as dublin;
use transito_provider_london as london;
use transito_provider_sydney as sydney;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // RUST_LOG wins over the verbose flag
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.verbose {
        EnvFilter::new("transito=debug,transito_core=debug")
    } else {
        EnvFilter::new("transito=info,transito_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    debug!(verbose = args.verbose, "logging initialized");

    let registry = build_registry(args.config.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::run(&registry, args.command, &mut out)?;
    out.flush()?;
    Ok(())
}

fn builtin_config(agency: Agencies) -> Result<AgencyConfig, ConfigError> {
    match agency {
        Agencies::London => london::config(),
        Agencies::Dublin => dublin::config(),
        Agencies::Sydney => sydney::config(),
    }
}

fn builtin_configs() -> Result<Vec<AgencyConfig>, ConfigError> {
    Agencies::ALL.into_iter().map(builtin_config).collect()
}

/// Registry of the built-in agencies plus any loaded from `config`.
///
/// No wire client is linked into this tool, so every adapter is detached.
pub(crate) fn build_registry(config: Option<&Path>) -> Result<AgencyRegistry> {
    let mut configs = builtin_configs().context("built-in agency tables are invalid")?;
    if let Some(path) = config {
        let extra = load_agencies(path)
            .with_context(|| format!("failed to load agencies from {}", path.display()))?;
        info!(count = extra.len(), path = %path.display(), "loaded extra agencies");
        configs.extend(extra);
    }
    let adapters = configs.into_iter().map(AgencyAdapter::detached).collect();
    Ok(AgencyRegistry::new(adapters)?)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::process;

    use super::*;
    use transito_core::model::AgencyId;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("transito-cli-{}-{name}", process::id()));
        fs::write(&path, contents).expect("temp file is writable");
        path
    }

    #[test]
    fn every_builtin_agency_has_its_own_config() {
        for agency in Agencies::ALL {
            let config = builtin_config(agency).expect("static config is valid");
            assert_eq!(config.id, AgencyId::from(agency));
        }
    }

    #[test]
    fn builtins_register_three_agencies() {
        let registry = build_registry(None).expect("built-in agencies load");
        assert_eq!(registry.len(), 3);
        for agency in ["london", "dublin", "sydney"] {
            assert!(registry.adapter(&AgencyId(agency.to_owned())).is_ok(), "{agency}");
        }
    }

    #[test]
    fn extra_agencies_come_from_toml() {
        let path = write_temp(
            "extra.toml",
            r#"
[[agency]]
id = "auckland"
name = "Auckland Transport"
region = "at"
timezone = "Pacific/Auckland"
capabilities = ["departures"]
"#,
        );
        let registry = build_registry(Some(&path)).expect("file loads");
        fs::remove_file(&path).ok();
        assert_eq!(registry.len(), 4);
        let adapter = registry
            .adapter(&AgencyId("auckland".to_owned()))
            .expect("registered");
        assert!(adapter.capabilities().is_empty());
    }

    #[test]
    fn duplicate_of_builtin_is_rejected() {
        let path = write_temp(
            "dup.toml",
            r#"
[[agency]]
id = "london"
name = "Second London"
region = "tfl"
timezone = "Europe/London"
"#,
        );
        let error = build_registry(Some(&path)).expect_err("duplicate id");
        fs::remove_file(&path).ok();
        assert!(matches!(
            error.downcast_ref::<ConfigError>(),
            Some(ConfigError::DuplicateAgency(id)) if id.0 == "london"
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = build_registry(Some(Path::new("/nonexistent/transito.toml")))
            .expect_err("file does not exist");
        assert!(format!("{error:#}").contains("/nonexistent/transito.toml"));
    }
}
