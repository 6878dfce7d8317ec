//! Device, queue and surface seams of the renderer.
//!
//! Device initialization, shader compilation and descriptor management live
//! behind these traits. [`headless`] provides an implementation that runs the
//! GPU timeline on a worker thread.

mod buffer;
mod command;
mod error;
mod fence;
pub mod headless;
pub mod uploader;

use std::sync::Arc;

pub use self::{
    buffer::{
        upload_slice, BufferId, BufferView, MappedMemory, PerFrameBuffer, UploadBuffer,
        WriteObserver, CONSTANT_BUFFER_ALIGNMENT,
    },
    command::{Command, CommandList, ResourceState, ScissorRect, Viewport},
    error::{GpuError, GpuResult, SyncError},
    fence::{Fence, FrameSync},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u64);

/// RGBA8 texture with a mip chain in device-local memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

impl Texture {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Number of levels of a full chain down to 1x1.
    pub fn full_mip_chain(width: u32, height: u32) -> u32 {
        32 - width.max(height).max(1).leading_zeros()
    }

    /// Extent of `level`, halved per level and clamped to 1.
    pub fn level_extent(&self, level: u32) -> (u32, u32) {
        mip_extent(self.width, self.height, level)
    }

    pub fn level_byte_size(&self, level: u32) -> usize {
        let (width, height) = self.level_extent(level);
        width as usize * height as usize * Self::BYTES_PER_PIXEL
    }

    /// Size of all levels together.
    pub fn byte_size(&self) -> usize {
        (0..self.mip_levels)
            .map(|level| self.level_byte_size(level))
            .sum()
    }
}

pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    let halve = |size: u32| size.checked_shr(level).unwrap_or(0).max(1);
    (halve(width), halve(height))
}

/// Root parameter slots shared by recorded commands and shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RootParameter {
    MaterialConstants = 0,
    TransformConstants = 1,
    TextureTable = 2,
    LightConstants = 3,
}

impl RootParameter {
    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Root signature and pipeline state produced by the shader provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineLayout {
    pub name: &'static str,
    pub parameters: &'static [RootParameter],
}

impl PipelineLayout {
    pub const OBJECT_3D: Self = Self {
        name: "object3d",
        parameters: &[
            RootParameter::MaterialConstants,
            RootParameter::TransformConstants,
            RootParameter::TextureTable,
            RootParameter::LightConstants,
        ],
    };
}

pub trait Device {
    /// Persistently mapped, CPU-writable memory.
    fn create_upload_buffer(&self, size: usize) -> GpuResult<UploadBuffer>;

    fn create_texture(&self, width: u32, height: u32, mip_levels: u32) -> GpuResult<Texture>;
}

pub trait Queue {
    /// Submits a closed command list.
    fn execute(&self, list: &CommandList) -> GpuResult<()>;

    /// Publishes `value` on `fence` once all previously submitted work finished.
    fn signal(&self, fence: &Arc<Fence>, value: u64) -> GpuResult<()>;
}

pub trait Surface {
    fn extent(&self) -> Extent;

    fn back_buffer_count(&self) -> usize;

    fn current_back_buffer_index(&self) -> usize;

    fn present(&mut self) -> GpuResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_parameter_slots() {
        let slots: Vec<u32> = PipelineLayout::OBJECT_3D
            .parameters
            .iter()
            .map(|p| p.index())
            .collect();

        assert_eq!(slots, vec![0, 1, 2, 3]);
    }

    #[test]
    fn texture_size() {
        let texture = Texture {
            id: TextureId(0),
            width: 4,
            height: 2,
            mip_levels: 1,
        };

        assert_eq!(texture.byte_size(), 32);
        assert!((Extent { width: 1280, height: 720 }.aspect() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn mip_chain_of_non_square_texture() {
        assert_eq!(Texture::full_mip_chain(8, 2), 4);
        assert_eq!(Texture::full_mip_chain(1, 1), 1);
        assert_eq!(Texture::full_mip_chain(1280, 720), 11);

        let texture = Texture {
            id: TextureId(0),
            width: 8,
            height: 2,
            mip_levels: 4,
        };
        let extents: Vec<_> = (0..4).map(|level| texture.level_extent(level)).collect();

        assert_eq!(extents, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        // 64 + 16 + 8 + 4 bytes
        assert_eq!(texture.byte_size(), 92);
    }
}
