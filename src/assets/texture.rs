use std::path::Path;

use image::{imageops::FilterType, RgbaImage};

use crate::{
    error::{EngineError, EngineResult},
    gpu::{mip_extent, Texture},
};

/// One level of a mip chain, tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decoded texture with its full mip chain, ready to be staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Level 0 first, down to 1x1.
    pub levels: Vec<MipLevel>,
}

impl TextureData {
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| EngineError::Texture {
                path: path.to_owned(),
                source,
            })?
            .to_rgba8();

        let texture = Self::from_image(image);
        log::debug!(
            "Decoded texture `{}` ({}x{}, {} mip levels)",
            path.display(),
            texture.width(),
            texture.height(),
            texture.mip_levels()
        );
        Ok(texture)
    }

    /// Builds the mip chain by filtering each level down from the previous one.
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let mip_levels = Texture::full_mip_chain(width, height);

        let mut levels = Vec::with_capacity(mip_levels as usize);
        let mut current = image;
        for level in 1..mip_levels {
            let (width, height) = mip_extent(width, height, level);
            let next = image::imageops::resize(&current, width, height, FilterType::Triangle);
            levels.push(Self::level(current));
            current = next;
        }
        levels.push(Self::level(current));

        Self { levels }
    }

    fn level(image: RgbaImage) -> MipLevel {
        MipLevel {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        }
    }

    /// Single white pixel.
    pub fn white() -> Self {
        Self {
            levels: vec![MipLevel {
                width: 1,
                height: 1,
                pixels: vec![255; 4],
            }],
        }
    }

    pub fn width(&self) -> u32 {
        self.levels.first().map_or(0, |level| level.width)
    }

    pub fn height(&self) -> u32 {
        self.levels.first().map_or(0, |level| level.height)
    }

    pub fn mip_levels(&self) -> u32 {
        self.levels.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_as_rgba() -> EngineResult<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixels.png");
        let mut image = image::RgbImage::new(2, 1);
        image.put_pixel(1, 0, image::Rgb([10, 20, 30]));
        image.save(&path).unwrap();

        let texture = TextureData::from_file(&path)?;
        assert_eq!((texture.width(), texture.height()), (2, 1));
        assert_eq!(texture.levels[0].pixels, vec![0, 0, 0, 255, 10, 20, 30, 255]);
        assert_eq!(texture.mip_levels(), 2);
        Ok(())
    }

    #[test]
    fn non_square_image_gets_full_mip_chain() {
        let image = RgbaImage::from_pixel(16, 4, image::Rgba([200, 100, 50, 255]));

        let texture = TextureData::from_image(image);
        let extents: Vec<_> = texture
            .levels
            .iter()
            .map(|level| (level.width, level.height))
            .collect();

        assert_eq!(texture.mip_levels(), 5);
        assert_eq!(extents, vec![(16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]);
        for level in &texture.levels {
            assert_eq!(level.pixels.len(), (level.width * level.height * 4) as usize);
        }
        // a uniform image stays uniform when filtered down
        let last = &texture.levels[4].pixels;
        for (is, should) in last.iter().zip([200u8, 100, 50, 255].iter()) {
            assert!((*is as i32 - *should as i32).abs() <= 1, "{:?}", last);
        }
    }

    #[test]
    fn missing_file_names_the_path() {
        match TextureData::from_file("does/not/exist.png") {
            Err(EngineError::Texture { path, .. }) => {
                assert_eq!(path, Path::new("does/not/exist.png"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
