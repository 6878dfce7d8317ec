//! Minimal `.mtl` support: only the diffuse texture (`map_Kd`) is read.

use std::{
    io::{self, BufRead},
    path::Path,
};

use fe_format::MaterialData;
use log::trace;

use crate::ParserError;

/// Reads the material library at `path`. Texture paths are joined with
/// `base_dir`, the directory of the model that referenced the library.
pub fn load(path: &Path, base_dir: &Path) -> Result<MaterialData, ParserError> {
    let file = std::fs::File::open(path).map_err(|source| ParserError::Io {
        path: path.to_owned(),
        source,
    })?;

    parse(io::BufReader::new(file), base_dir).map_err(|error| match error {
        ParserError::Io { source, .. } => ParserError::Io {
            path: path.to_owned(),
            source,
        },
        error => ParserError::MaterialLibrary {
            path: path.to_owned(),
            source: Box::new(error),
        },
    })
}

pub fn parse<R: BufRead>(reader: R, base_dir: &Path) -> Result<MaterialData, ParserError> {
    let mut material = MaterialData::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ParserError::Io {
            path: base_dir.to_owned(),
            source,
        })?;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("map_Kd") => {
                // options such as `-s 1 1 1` precede the file name
                let file = tokens.last().ok_or(ParserError::MissingArgument {
                    line: idx + 1,
                    directive: "map_Kd",
                })?;
                material.texture_file_path = Some(base_dir.join(file));
            }
            Some(directive) if !directive.starts_with('#') => {
                trace!("Ignoring material directive `{}`", directive)
            }
            _ => {}
        }
    }

    Ok(material)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn diffuse_map_is_relative_to_model_directory() -> Result<(), ParserError> {
        let source = "# material\nnewmtl Material\nKd 1 1 1\nmap_Kd textures/a.png\n";
        let material = parse(source.as_bytes(), Path::new("assets"))?;

        assert_eq!(
            material.texture_file_path,
            Some(PathBuf::from("assets").join("textures/a.png"))
        );
        Ok(())
    }

    #[test]
    fn texture_options_are_skipped() -> Result<(), ParserError> {
        let material = parse("map_Kd -s 2 2 1 checker.png".as_bytes(), Path::new("res"))?;

        assert_eq!(material.texture_file_path, Some(PathBuf::from("res/checker.png")));
        Ok(())
    }

    #[test]
    fn no_diffuse_map() -> Result<(), ParserError> {
        let material = parse("newmtl Material\nNs 250\n".as_bytes(), Path::new("res"))?;

        assert_eq!(material.texture_file_path, None);
        Ok(())
    }

    #[test]
    fn map_kd_without_file() {
        let error = parse("newmtl a\nmap_Kd\n".as_bytes(), Path::new("res")).unwrap_err();

        assert!(matches!(error, ParserError::MissingArgument { line: 2, .. }));
    }
}
