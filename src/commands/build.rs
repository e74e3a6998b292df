use anyhow::Result;

use cascade::aggregate::write_aggregate;
use cascade::compiler::ScssCompiler;
use cascade::error::CascadeError;
use cascade::staging::Staging;

use crate::cli::PathArgs;
use crate::commands::resolve_config;

pub fn cmd_build(paths: PathArgs, json: bool, verbose: u8) -> Result<()> {
    let config = resolve_config(paths);

    if !config.paths.source.is_dir() {
        return Err(CascadeError::SourceRootMissing {
            path: config.paths.source.clone(),
        }
        .into());
    }

    let staging = Staging::from_config(&config);
    staging.reset()?;

    let compiler = ScssCompiler::new();
    let summary = staging.compile_all(&compiler)?;

    if verbose > 0 && !json {
        for source in staging.list_sources()? {
            println!("  {} -> {}", source.display(), staging.unit_path(&source).display());
        }
    }

    let units = write_aggregate(
        staging.staging_root(),
        &config.paths.output,
        &config.build.output_extension,
    )?;

    if json {
        let output = serde_json::json!({
            "event": "build_complete",
            "compiled": summary.compiled,
            "units": units,
            "errors": summary.errors.len(),
            "output": config.paths.output.display().to_string(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Compiled {} units -> {}",
            summary.compiled,
            config.paths.output.display()
        );
    }

    if !summary.errors.is_empty() {
        for message in &summary.errors {
            eprintln!("error: {message}");
        }
        std::process::exit(1);
    }

    Ok(())
}
