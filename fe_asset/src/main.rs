mod utils;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use structopt::StructOpt;

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "fe_asset")]
struct CliArgs {
    /// Specify the model files to convert using glob
    glob: String,
    /// Output directory, to place the converted models in
    #[structopt(short = "o", long = "output")]
    output: PathBuf,
    /// Output debug info
    #[structopt(long = "verbose")]
    verbose: bool,
}

/// Happens during setup
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Invalid glob pattern")]
    PatternError(#[from] glob::PatternError),
    #[error("Invalid glob")]
    GlobError(#[from] glob::GlobError),
    #[error("Output folder does not exist: {0}")]
    OutputFolderNonExistant(String),
}

const GLOB_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    prepare(args)
}

fn prepare(args: CliArgs) -> Result<()> {
    let output_path = args.output.as_path();
    if !output_path.is_dir() {
        return Err(CliError::OutputFolderNonExistant(output_path.display().to_string()).into());
    }

    let glob = glob::glob_with(&args.glob, GLOB_OPTIONS).map_err(CliError::from)?;
    let mut converted = 0;
    for path in glob {
        let path = path.map_err(CliError::from)?;

        if path.is_dir() {
            continue;
        }

        // check extension
        if let Some(Some(extension)) = path.extension().map(|x| x.to_str()) {
            match extension.to_ascii_lowercase().as_ref() {
                "obj" => {
                    process(&path, output_path)?;
                    converted += 1;
                }
                "toml" | "mtl" => debug!("Ignored companion file: {}", &path.display()),
                _ => warn!("Could not handle path: {}", &path.display()),
            }
        } else {
            warn!(
                "Ignored file \"{}\", because no file extension was found.",
                path.display()
            );
        }
    }

    info!("Converted {} model(s)", converted);
    Ok(())
}

fn process(path: &Path, output_dir: &Path) -> Result<()> {
    info!("Processing Wavefront `.obj`-file: `{}`", path.display());

    let model = fe_asset::load(path)?;
    let data = model.to_bytes().context("Could not serialize ModelData")?;

    let target = utils::combine_path(output_dir, utils::file_name(path)?, "fem");
    utils::write_file(&target, &data)?;
    debug!("Wrote `{}`", target.display());
    Ok(())
}
