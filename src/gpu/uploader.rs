use super::{
    upload_slice, Command, CommandList, Device, FrameSync, GpuError, GpuResult, Queue, Texture,
};
use crate::{assets::TextureData, error::EngineResult};

/// Collects texture uploads into one copy command list.
///
/// Staging buffers are kept alive until [`finish`](Uploader::finish) has
/// waited for the copy to complete on the GPU.
#[derive(Debug)]
pub struct Uploader {
    commands: CommandList,
    staging_buffers: Vec<super::UploadBuffer>,
}

impl Uploader {
    pub fn new() -> Self {
        Self {
            commands: CommandList::new("upload"),
            staging_buffers: Vec::new(),
        }
    }

    /// Creates a texture and records one copy per mip level of `data`.
    pub fn texture<D: Device + ?Sized>(
        &mut self,
        device: &D,
        data: &TextureData,
    ) -> GpuResult<Texture> {
        let texture = device.create_texture(data.width(), data.height(), data.mip_levels())?;

        let mut offsets = Vec::with_capacity(data.levels.len());
        let mut size = 0;
        for (level, mip) in (0..).zip(&data.levels) {
            let expected = texture.level_byte_size(level);
            if mip.pixels.len() != expected {
                return Err(GpuError::OutOfBounds {
                    offset: size,
                    len: mip.pixels.len(),
                    size: expected,
                });
            }
            offsets.push(size);
            size += expected;
        }

        let pixels: Vec<u8> = data
            .levels
            .iter()
            .flat_map(|mip| mip.pixels.iter().copied())
            .collect();
        let staging = upload_slice(device, &pixels[..])?;
        for (level, offset) in (0..).zip(offsets) {
            self.commands.record(Command::CopyBufferToTexture {
                source: staging.view(offset, texture.level_byte_size(level), 1),
                texture: texture.id,
                mip_level: level,
            })?;
        }
        self.staging_buffers.push(staging);

        log::debug!(
            "Staged {}x{} texture {:?} with {} levels",
            texture.width,
            texture.height,
            texture.id,
            texture.mip_levels
        );
        Ok(texture)
    }

    pub fn is_empty(&self) -> bool {
        self.staging_buffers.is_empty()
    }

    /// Submits the recorded copies and blocks until the GPU executed them.
    ///
    /// Signaling or waiting only fails once the device is lost or the queue
    /// stopped. The timeline then no longer reads the staging memory, so it is
    /// released together with the error.
    pub fn finish<Q: Queue + ?Sized>(mut self, queue: &Q, sync: &mut FrameSync) -> EngineResult<()> {
        if self.is_empty() {
            return Ok(());
        }

        self.commands.close();
        queue.execute(&self.commands)?;
        let value = sync.signal(queue)?;
        sync.wait_until(value)?;

        log::debug!("Uploaded {} staging buffers", self.staging_buffers.len());
        Ok(())
    }
}

impl Default for Uploader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::*;
    use crate::{
        assets::MipLevel,
        gpu::{
            headless::{HeadlessConfig, HeadlessDevice, HeadlessQueue},
            Fence,
        },
    };

    fn two_levels() -> TextureData {
        TextureData {
            levels: vec![
                MipLevel {
                    width: 2,
                    height: 2,
                    pixels: (0..16).collect(),
                },
                MipLevel {
                    width: 1,
                    height: 1,
                    pixels: vec![9; 4],
                },
            ],
        }
    }

    #[test]
    fn staged_levels_reach_the_texture() -> EngineResult<()> {
        let device = HeadlessDevice::new(&HeadlessConfig::default());
        let queue = HeadlessQueue::new(&device, Duration::from_millis(5));
        let mut sync = FrameSync::new();

        let mut uploader = Uploader::new();
        let texture = uploader.texture(&device, &two_levels())?;
        uploader.finish(&queue, &mut sync)?;

        assert_eq!(texture.mip_levels, 2);
        assert_eq!(device.texture_level(texture.id, 0), Some((0..16).collect()));
        assert_eq!(device.texture_level(texture.id, 1), Some(vec![9; 4]));
        assert_eq!(sync.last_signaled(), 1);
        assert_eq!(device.stats().hazards, 0);
        assert_eq!(device.stats().texture_uploads, 2);
        // staging memory is released once the upload finished
        assert_eq!(device.used_memory(), texture.byte_size());
        Ok(())
    }

    #[test]
    fn level_size_must_match() {
        let device = HeadlessDevice::new(&HeadlessConfig::default());
        let mut uploader = Uploader::new();
        let mut data = two_levels();
        data.levels[1].pixels.push(0);

        assert!(matches!(
            uploader.texture(&device, &data),
            Err(GpuError::OutOfBounds { .. })
        ));
    }

    /// Loses the device right after accepting a submission.
    struct LosingQueue {
        inner: HeadlessQueue,
        device: HeadlessDevice,
    }

    impl Queue for LosingQueue {
        fn execute(&self, list: &CommandList) -> GpuResult<()> {
            let result = self.inner.execute(list);
            self.device.simulate_device_lost();
            result
        }

        fn signal(&self, fence: &Arc<Fence>, value: u64) -> GpuResult<()> {
            self.inner.signal(fence, value)
        }
    }

    #[test]
    fn device_lost_during_upload_is_fatal_without_hazards() {
        let device = HeadlessDevice::new(&HeadlessConfig::default());
        let queue = LosingQueue {
            inner: HeadlessQueue::new(&device, Duration::from_millis(0)),
            device: device.clone(),
        };
        let mut sync = FrameSync::new();

        let mut uploader = Uploader::new();
        uploader.texture(&device, &two_levels()).unwrap();
        let error = uploader.finish(&queue, &mut sync).unwrap_err();
        assert!(error.is_fatal(), "{}", error);

        // joins the timeline, so every queued copy has been looked at
        drop(queue);
        assert_eq!(device.stats().hazards, 0);
    }
}
