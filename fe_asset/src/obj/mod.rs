mod builder;
mod parser;

use std::{
    io::{self, BufRead},
    path::Path,
};

use fe_format::ModelData;
use log::info;

use crate::{LoadOptions, ParserError};

/// Loads a model with the options found next to it (see [`LoadOptions::for_model`]).
pub fn load(path: &Path) -> Result<ModelData, ParserError> {
    load_with_options(path, LoadOptions::for_model(path)?)
}

pub fn load_with_options(path: &Path, options: LoadOptions) -> Result<ModelData, ParserError> {
    info!("Loading Wavefront `.obj`-file: `{}`", path.display());

    let file = std::fs::File::open(path).map_err(|source| ParserError::Io {
        path: path.to_owned(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    let model = parser::parse(io::BufReader::new(file), base_dir, options).map_err(|error| {
        match error {
            ParserError::Io { source, .. } => ParserError::Io {
                path: path.to_owned(),
                source,
            },
            error => error,
        }
    })?;

    info!(
        "Loaded {} triangles from `{}`",
        model.triangle_count(),
        path.display()
    );
    Ok(model)
}

/// Parses an in-memory model. `mtllib` references are resolved against `base_dir`.
pub fn parse_str(source: &str, base_dir: &Path) -> Result<ModelData, ParserError> {
    parse_reader(source.as_bytes(), base_dir, LoadOptions::default())
}

pub fn parse_reader<R: BufRead>(
    reader: R,
    base_dir: &Path,
    options: LoadOptions,
) -> Result<ModelData, ParserError> {
    parser::parse(reader, base_dir, options)
}
