use std::{fs, path::Path};

use crystal::prelude::*;
use fe_asset::{LoadOptions, ParserError};

const TRIANGLE: &str = "\
mtllib model.mtl
v 0.0 1.0 0.0
v 1.0 -1.0 0.0
v -1.0 -1.0 0.0
vt 0.5 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl Material
f 1/1/1 2/2/1 3/3/1
";

fn write_model(root: &Path) -> std::io::Result<std::path::PathBuf> {
    let assets = root.join("assets");
    fs::create_dir_all(&assets)?;
    fs::write(assets.join("model.obj"), TRIANGLE)?;
    fs::write(
        assets.join("model.mtl"),
        "newmtl Material\nKd 0.8 0.8 0.8\nmap_Kd textures/a.png\n",
    )?;
    Ok(assets.join("model.obj"))
}

#[test]
fn texture_path_is_joined_with_model_directory() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let model = fe_asset::load(&write_model(dir.path())?)?;

    assert_eq!(
        model.material.texture_file_path,
        Some(dir.path().join("assets").join("textures/a.png"))
    );
    assert_eq!(model.vertices.len(), 3);
    Ok(())
}

#[test]
fn model_is_converted_to_left_handed() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let model = fe_asset::load(&write_model(dir.path())?)?;

    let first = model.vertices[0];
    assert_eq!(first.position, Vec4::new(1.0, -1.0, 0.0, 1.0));
    assert_eq!(first.texcoord, Vec2::new(0.0, 0.0));
    assert_eq!(first.normal, Vec3::new(0.0, 0.0, 1.0));
    Ok(())
}

#[test]
fn folder_options_are_applied() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_model(dir.path())?;
    fs::write(
        dir.path().join("assets/obj.toml"),
        "flip_handedness = false\nflip_texcoord_v = false\n",
    )?;

    let model = fe_asset::load(&path)?;
    assert_eq!(model.vertices[0].position, Vec4::new(0.0, 1.0, 0.0, 1.0));
    assert_eq!(model.vertices[0].texcoord, Vec2::new(0.5, 0.0));

    let defaults = fe_asset::load_with_options(&path, LoadOptions::default())?;
    assert_eq!(defaults.vertices[0].position, Vec4::new(1.0, -1.0, 0.0, 1.0));
    Ok(())
}

#[test]
fn missing_model_reports_path() {
    let error = fe_asset::load(Path::new("does/not/exist.obj")).unwrap_err();

    match error {
        ParserError::Io { path, .. } => assert_eq!(path, Path::new("does/not/exist.obj")),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn parse_errors_carry_line_numbers() {
    let error = fe_asset::parse_str("v 0 0 0\nv 1 nope 0\n", Path::new("")).unwrap_err();

    assert_eq!(error.line(), Some(2));
    assert!(error.to_string().contains("nope"));
}

#[test]
fn material_errors_are_wrapped() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("broken.mtl"), "newmtl a\nmap_Kd\n")?;

    let error = fe_asset::parse_str("mtllib broken.mtl\n", dir.path()).unwrap_err();

    assert!(matches!(error, ParserError::MaterialLibrary { .. }));
    assert_eq!(error.line(), Some(2));
    Ok(())
}
