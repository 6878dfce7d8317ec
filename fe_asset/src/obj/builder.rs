use std::path::PathBuf;

use crystal::prelude::*;
use fe_format::{MaterialData, ModelData, VertexData};

use crate::{LoadOptions, ParserError};

/// One `p/t/n` corner, still 1-based as written in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ObjCorner {
    pub(crate) position: usize,
    pub(crate) texcoord: usize,
    pub(crate) normal: usize,
}

#[derive(Debug, Default)]
pub(crate) struct ObjModelBuilder {
    options: LoadOptions,
    positions: Vec<Vec4<f32>>,
    texcoords: Vec<Vec2<f32>>,
    normals: Vec<Vec3<f32>>,
    vertices: Vec<VertexData>,
    material: MaterialData,
    material_library: Option<PathBuf>,
}

impl ObjModelBuilder {
    pub(crate) fn new(options: LoadOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub(crate) fn push_position(&mut self, [x, y, z]: [f32; 3]) {
        let x = if self.options.flip_handedness { -x } else { x };
        self.positions.push(Vec4::new(x, y, z, 1.0));
    }

    pub(crate) fn push_texcoord(&mut self, [u, v]: [f32; 2]) {
        let v = if self.options.flip_texcoord_v { 1.0 - v } else { v };
        self.texcoords.push(Vec2::new(u, v));
    }

    pub(crate) fn push_normal(&mut self, [x, y, z]: [f32; 3]) {
        let x = if self.options.flip_handedness { -x } else { x };
        self.normals.push(Vec3::new(x, y, z));
    }

    /// Resolves the corners against the tables read so far and appends the
    /// triangle, reversing the winding when the handedness is flipped.
    pub(crate) fn push_face(&mut self, line: usize, corners: [ObjCorner; 3]) -> Result<(), ParserError> {
        let mut triangle = [VertexData::default(); 3];
        for (vertex, corner) in triangle.iter_mut().zip(corners.iter()) {
            *vertex = VertexData::new(
                *lookup(&self.positions, corner.position, line, "position")?,
                *lookup(&self.texcoords, corner.texcoord, line, "texcoord")?,
                *lookup(&self.normals, corner.normal, line, "normal")?,
            );
        }

        if self.options.flip_handedness {
            triangle.reverse();
        }
        self.vertices.extend_from_slice(&triangle);
        Ok(())
    }

    pub(crate) fn set_material(&mut self, library: PathBuf, material: MaterialData) {
        if let Some(previous) = self.material_library.replace(library) {
            log::warn!(
                "Only one material library is supported, replacing `{}`",
                previous.display()
            );
        }
        self.material = material;
    }

    pub(crate) fn build_model(self) -> ModelData {
        ModelData {
            vertices: self.vertices,
            material: self.material,
        }
    }
}

fn lookup<'a, T>(
    table: &'a [T],
    index: usize,
    line: usize,
    kind: &'static str,
) -> Result<&'a T, ParserError> {
    index
        .checked_sub(1)
        .and_then(|idx| table.get(idx))
        .ok_or(ParserError::IndexOutOfRange {
            line,
            kind,
            index,
            len: table.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(idx: usize) -> ObjCorner {
        ObjCorner {
            position: idx,
            texcoord: idx,
            normal: 1,
        }
    }

    #[test]
    fn face_uses_tables_read_so_far() {
        let mut builder = ObjModelBuilder::new(LoadOptions::default());
        builder.push_position([1.0, 0.0, 0.0]);
        builder.push_texcoord([0.0, 0.25]);
        builder.push_normal([1.0, 0.0, 0.0]);

        let error = builder
            .push_face(7, [corner(1), corner(1), corner(2)])
            .unwrap_err();

        assert!(matches!(
            error,
            ParserError::IndexOutOfRange {
                line: 7,
                kind: "position",
                index: 2,
                len: 1
            }
        ));
    }

    #[test]
    fn zero_index_is_out_of_range() {
        let mut builder = ObjModelBuilder::new(LoadOptions::default());
        builder.push_position([0.0, 0.0, 0.0]);

        assert!(builder.push_face(1, [corner(0), corner(1), corner(1)]).is_err());
    }

    #[test]
    fn options_disable_conversions() -> Result<(), ParserError> {
        let mut builder = ObjModelBuilder::new(LoadOptions {
            flip_handedness: false,
            flip_texcoord_v: false,
        });
        for x in [1.0, 2.0, 3.0] {
            builder.push_position([x, 0.0, 0.0]);
            builder.push_texcoord([0.0, 0.25]);
        }
        builder.push_normal([1.0, 0.0, 0.0]);
        builder.push_face(1, [corner(1), corner(2), corner(3)])?;

        let model = builder.build_model();
        let xs: Vec<f32> = model.vertices.iter().map(|v| *v.position.x()).collect();

        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(*model.vertices[0].texcoord.y(), 0.25);
        assert_eq!(*model.vertices[0].normal.x(), 1.0);
        Ok(())
    }
}
