use std::{io, num, path::PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ParserError {
    #[error("Failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Line {line}: failed to parse float `{value}`")]
    ParseFloat {
        line: usize,
        value: String,
        #[source]
        source: num::ParseFloatError,
    },
    #[error("Line {line}: failed to parse index `{value}`")]
    ParseIndex {
        line: usize,
        value: String,
        #[source]
        source: num::ParseIntError,
    },
    #[error("Line {line}: `{directive}` needs at least {expected} values, found {found}")]
    MissingComponents {
        line: usize,
        directive: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}: faces must have exactly 3 corners, found {found}")]
    FaceCorners { line: usize, found: usize },
    #[error("Line {line}: face corner `{corner}` is not `position/texcoord/normal`")]
    MalformedCorner { line: usize, corner: String },
    #[error("Line {line}: {kind} index {index} is out of range (1..={len})")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Line {line}: `{directive}` is missing its argument")]
    MissingArgument { line: usize, directive: &'static str },
    #[error("Material library `{path}`: {source}")]
    MaterialLibrary {
        path: PathBuf,
        #[source]
        source: Box<ParserError>,
    },
    #[error("Invalid load options in `{path}`: {source}")]
    Meta {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ParserError {
    /// Line in the file that was being parsed, if the error is tied to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParserError::ParseFloat { line, .. }
            | ParserError::ParseIndex { line, .. }
            | ParserError::MissingComponents { line, .. }
            | ParserError::FaceCorners { line, .. }
            | ParserError::MalformedCorner { line, .. }
            | ParserError::IndexOutOfRange { line, .. }
            | ParserError::MissingArgument { line, .. } => Some(*line),
            ParserError::MaterialLibrary { source, .. } => source.line(),
            ParserError::Io { .. } | ParserError::Meta { .. } => None,
        }
    }
}
