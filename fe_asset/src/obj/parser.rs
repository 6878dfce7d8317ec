use std::{io::BufRead, path::Path};

use fe_format::ModelData;
use log::{debug, trace};

use super::builder::{ObjCorner, ObjModelBuilder};
use crate::{mtl, LoadOptions, ParserError};

// Wavefront obj (https://en.wikipedia.org/wiki/Wavefront_.obj_file), restricted
// to triangulated models with full `p/t/n` corners. Anything else fails the load.
pub(crate) fn parse<R: BufRead>(
    reader: R,
    base_dir: &Path,
    options: LoadOptions,
) -> Result<ModelData, ParserError> {
    let mut builder = ObjModelBuilder::new(options);

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ParserError::Io {
            path: base_dir.to_owned(),
            source,
        })?;
        let mut tokens = line.split_whitespace();

        if let Some(token) = tokens.next() {
            let values: Vec<&str> = tokens.collect();
            parse_token(token, &values, idx + 1, base_dir, &mut builder)?;
        }
    }

    Ok(builder.build_model())
}

fn parse_token(
    token: &str,
    values: &[&str],
    line: usize,
    base_dir: &Path,
    builder: &mut ObjModelBuilder,
) -> Result<(), ParserError> {
    match token {
        "v" => builder.push_position(parse_floats("v", values, line)?),
        "vt" => builder.push_texcoord(parse_floats("vt", values, line)?),
        "vn" => builder.push_normal(parse_floats("vn", values, line)?),
        "f" => builder.push_face(line, parse_face(values, line)?)?,
        "mtllib" => {
            let file = values.first().ok_or(ParserError::MissingArgument {
                line,
                directive: "mtllib",
            })?;
            let library = base_dir.join(file);
            let material = mtl::load(&library, base_dir)?;
            builder.set_material(library, material);
        }
        comment if comment.starts_with('#') => trace!("Comment: {:?}", values.join(" ")),
        _ => debug!("Ignoring directive `{}` on line {}", token, line),
    };

    Ok(())
}

/// Reads the first `N` values. Extra values (`w` of a position, the third
/// texture coordinate) are ignored.
fn parse_floats<const N: usize>(
    directive: &'static str,
    values: &[&str],
    line: usize,
) -> Result<[f32; N], ParserError> {
    if values.len() < N {
        return Err(ParserError::MissingComponents {
            line,
            directive,
            expected: N,
            found: values.len(),
        });
    }

    let mut numbers = [0.0; N];
    for (number, value) in numbers.iter_mut().zip(values) {
        *number = value.parse().map_err(|source| ParserError::ParseFloat {
            line,
            value: (*value).to_owned(),
            source,
        })?;
    }
    Ok(numbers)
}

fn parse_face(values: &[&str], line: usize) -> Result<[ObjCorner; 3], ParserError> {
    match values {
        [a, b, c] => Ok([
            parse_corner(a, line)?,
            parse_corner(b, line)?,
            parse_corner(c, line)?,
        ]),
        _ => Err(ParserError::FaceCorners {
            line,
            found: values.len(),
        }),
    }
}

// a single `p/t/n` corner, every component required
fn parse_corner(value: &str, line: usize) -> Result<ObjCorner, ParserError> {
    let triplet = parse_triplet(value, line)?;

    match triplet.as_slice() {
        [Some(position), Some(texcoord), Some(normal)] => Ok(ObjCorner {
            position: *position,
            texcoord: *texcoord,
            normal: *normal,
        }),
        _ => Err(ParserError::MalformedCorner {
            line,
            corner: value.to_owned(),
        }),
    }
}

// parse a triplet separated by slashes; empty components become `None`
fn parse_triplet(value: &str, line: usize) -> Result<Vec<Option<usize>>, ParserError> {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != 3 {
        return Err(ParserError::MalformedCorner {
            line,
            corner: value.to_owned(),
        });
    }

    parts
        .into_iter()
        .map(|part| {
            if part.is_empty() {
                Ok(None)
            } else {
                part.parse().map(Some).map_err(|source| ParserError::ParseIndex {
                    line,
                    value: part.to_owned(),
                    source,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use crystal::prelude::*;

    use super::*;

    const QUAD: &str = "\
# two triangles
o Plane
v 1.0 0.0 -1.0
v -1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
vt 1.0 0.0
vt 0.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 1.0 0.0
vn 1.0 0.0 0.0
s off
f 1/1/1 2/2/1 3/3/2
f 2/2/1 4/4/1 3/3/2
";

    fn parse_quad() -> Result<ModelData, ParserError> {
        parse(QUAD.as_bytes(), Path::new(""), LoadOptions::default())
    }

    #[test]
    fn test_parse_triplet() -> Result<(), ParserError> {
        assert_eq!(parse_triplet("1/2/3", 1)?, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(parse_triplet("1//3", 1)?, vec![Some(1), None, Some(3)]);
        assert!(parse_triplet("1/2", 1).is_err());
        assert!(matches!(
            parse_triplet("1/x/3", 4),
            Err(ParserError::ParseIndex { line: 4, .. })
        ));

        Ok(())
    }

    #[test]
    fn test_parse_floats() -> Result<(), ParserError> {
        assert_eq!(parse_floats::<3>("v", &["1", "2.5", "-3", "1.0"], 1)?, [1.0, 2.5, -3.0]);
        assert!(matches!(
            parse_floats::<3>("vn", &["1", "2"], 9),
            Err(ParserError::MissingComponents {
                line: 9,
                expected: 3,
                found: 2,
                ..
            })
        ));
        assert!(matches!(
            parse_floats::<2>("vt", &["1", "abc"], 2),
            Err(ParserError::ParseFloat { line: 2, .. })
        ));

        Ok(())
    }

    #[test]
    fn quad_expands_to_six_reversed_vertices() -> Result<(), ParserError> {
        let model = parse_quad()?;

        assert_eq!(model.vertices.len(), 6);
        assert_eq!(model.triangle_count(), 2);

        // first face `1 2 3` is emitted as 3, 2, 1
        let xs: Vec<f32> = model.vertices.iter().map(|v| *v.position.x()).collect();
        assert_eq!(xs, vec![-1.0, 1.0, -1.0, -1.0, 1.0, 1.0]);

        let first = model.vertices[2];
        assert_eq!(first.position, Vec4::new(-1.0, 0.0, -1.0, 1.0));
        assert_eq!(first.texcoord, Vec2::new(1.0, 1.0));
        assert_eq!(first.normal, Vec3::new(0.0, 1.0, 0.0));

        let flipped_normal = model.vertices[0].normal;
        assert_eq!(flipped_normal, Vec3::new(-1.0, 0.0, 0.0));

        Ok(())
    }

    #[test]
    fn texcoord_v_is_flipped() -> Result<(), ParserError> {
        let model = parse_quad()?;

        // `vt 0.0 1.0` of corner 4
        assert_eq!(model.vertices[4].texcoord, Vec2::new(0.0, 0.0));
        // `vt 0.0 0.0` of corner 2
        assert_eq!(model.vertices[5].texcoord, Vec2::new(0.0, 1.0));
        Ok(())
    }

    #[test]
    fn quads_are_rejected() {
        let source = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1 1/1/1\n";
        let error = parse(source.as_bytes(), Path::new(""), LoadOptions::default()).unwrap_err();

        assert!(matches!(error, ParserError::FaceCorners { line: 4, found: 4 }));
    }

    #[test]
    fn corners_without_texcoord_are_rejected() {
        let source = "v 0 0 0\nvn 0 0 1\nf 1//1 1//1 1//1\n";
        let error = parse(source.as_bytes(), Path::new(""), LoadOptions::default()).unwrap_err();

        assert!(matches!(error, ParserError::MalformedCorner { line: 3, .. }));
    }

    #[test]
    fn forward_references_are_out_of_range() {
        let source = "vt 0 0\nvn 0 0 1\nv 0 0 0\nf 1/1/1 2/1/1 1/1/1\nv 1 1 1\n";
        let error = parse(source.as_bytes(), Path::new(""), LoadOptions::default()).unwrap_err();

        assert_eq!(error.line(), Some(4));
    }

    #[test]
    fn missing_material_library_fails() {
        let error = parse(
            "mtllib nowhere.mtl\n".as_bytes(),
            Path::new("does/not/exist"),
            LoadOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(error, ParserError::Io { .. }));
    }

    #[test]
    fn empty_source_is_empty_model() -> Result<(), ParserError> {
        let model = parse("\n\n# nothing\n".as_bytes(), Path::new(""), LoadOptions::default())?;

        assert!(model.vertices.is_empty());
        assert_eq!(model.material.texture_file_path, None);
        Ok(())
    }
}
