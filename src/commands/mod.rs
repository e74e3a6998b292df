pub mod build;
pub mod watch;

use std::path::Path;

use cascade::config::{self, Config};

use crate::cli::PathArgs;

/// Resolve effective configuration: cascade.toml + env overrides, then CLI
/// flags on top. Unknown config keys warn but never fail.
pub(crate) fn resolve_config(paths: PathArgs) -> Config {
    let config_path = Path::new("cascade.toml");
    let config = if config_path.exists() {
        match config::load_with_warnings(config_path) {
            Ok((config, warnings)) => {
                for warning in &warnings {
                    eprintln!(
                        "warning: unknown config key '{}' in {}",
                        warning.key,
                        warning.file.display()
                    );
                }
                config
            }
            Err(e) => {
                eprintln!("warning: {e}, using defaults");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    let mut config = config::with_env_overrides(config);
    if let Some(source) = paths.source {
        config.paths.source = source;
    }
    if let Some(staging) = paths.staging {
        config.paths.staging = staging;
    }
    if let Some(output) = paths.output {
        config.paths.output = output;
    }
    config
}
