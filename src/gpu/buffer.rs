use std::{fmt, marker::PhantomData, mem, ops::Range, sync::Arc};

use bytemuck::Pod;
use parking_lot::Mutex;

use super::{Device, GpuError, GpuResult};

/// Constant buffer views must start on this boundary.
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) u64);

/// Notified on every CPU write into mapped memory.
pub trait WriteObserver: Send + Sync + fmt::Debug {
    fn cpu_write(&self, buffer: BufferId, range: Range<usize>);
}

/// GPU-visible memory that stays mapped for its whole lifetime.
#[derive(Debug)]
pub struct MappedMemory {
    id: BufferId,
    bytes: Mutex<Vec<u8>>,
    observer: Option<Arc<dyn WriteObserver>>,
}

impl MappedMemory {
    pub fn new(id: BufferId, size: usize, observer: Option<Arc<dyn WriteObserver>>) -> Self {
        Self {
            id,
            bytes: Mutex::new(vec![0; size]),
            observer,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn size(&self) -> usize {
        self.bytes.lock().len()
    }

    pub fn write(&self, offset: usize, data: &[u8]) -> GpuResult<()> {
        let mut bytes = self.bytes.lock();
        let end = offset
            .checked_add(data.len())
            .filter(|end| *end <= bytes.len())
            .ok_or(GpuError::OutOfBounds {
                offset,
                len: data.len(),
                size: bytes.len(),
            })?;

        if let Some(observer) = &self.observer {
            observer.cpu_write(self.id, offset..end);
        }
        bytes[offset..end].copy_from_slice(data);
        Ok(())
    }

    pub fn read(&self, range: Range<usize>) -> Option<Vec<u8>> {
        self.bytes.lock().get(range).map(<[u8]>::to_vec)
    }

    pub fn read_pod<T: Pod>(&self, offset: usize) -> Option<T> {
        let bytes = self.read(offset..offset + mem::size_of::<T>())?;
        Some(bytemuck::pod_read_unaligned(&bytes))
    }
}

/// A range of a buffer as referenced by recorded commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferView {
    pub buffer: BufferId,
    pub offset: usize,
    pub size: usize,
    pub stride: usize,
}

impl BufferView {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size
    }

    pub fn overlaps(&self, buffer: BufferId, range: &Range<usize>) -> bool {
        self.buffer == buffer && self.offset < range.end && range.start < self.offset + self.size
    }

    pub fn element_count(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.size / self.stride
        }
    }
}

/// Persistently mapped upload-heap buffer with a single CPU writer.
#[derive(Debug)]
pub struct UploadBuffer {
    memory: Arc<MappedMemory>,
}

impl UploadBuffer {
    pub fn new(memory: Arc<MappedMemory>) -> Self {
        Self { memory }
    }

    pub fn id(&self) -> BufferId {
        self.memory.id()
    }

    pub fn size(&self) -> usize {
        self.memory.size()
    }

    pub fn memory(&self) -> &Arc<MappedMemory> {
        &self.memory
    }

    pub fn write<T: Pod>(&mut self, offset: usize, data: &[T]) -> GpuResult<()> {
        self.memory.write(offset, bytemuck::cast_slice(data))
    }

    pub fn view(&self, offset: usize, size: usize, stride: usize) -> BufferView {
        BufferView {
            buffer: self.id(),
            offset,
            size,
            stride,
        }
    }

    /// View over the whole buffer, interpreted as elements of `T`.
    pub fn view_of<T>(&self) -> BufferView {
        self.view(0, self.size(), mem::size_of::<T>())
    }
}

/// Creates an upload buffer holding `data`.
pub fn upload_slice<D, T>(device: &D, data: &[T]) -> GpuResult<UploadBuffer>
where
    D: Device + ?Sized,
    T: Pod,
{
    let mut buffer = device.create_upload_buffer(mem::size_of_val(data))?;
    buffer.write(0, data)?;
    Ok(buffer)
}

/// One aligned instance of `T` per frame in flight, in a single buffer.
#[derive(Debug)]
pub struct PerFrameBuffer<T> {
    buffer: UploadBuffer,
    aligned_data_size: usize,
    num_frames: usize,
    _marker: PhantomData<T>,
}

impl<T: Pod> PerFrameBuffer<T> {
    pub fn new<D: Device + ?Sized>(device: &D, num_frames: usize) -> GpuResult<Self> {
        let data_size = mem::size_of::<T>();
        let aligned_data_size = (data_size + CONSTANT_BUFFER_ALIGNMENT - 1)
            / CONSTANT_BUFFER_ALIGNMENT
            * CONSTANT_BUFFER_ALIGNMENT;

        let buffer = device.create_upload_buffer(aligned_data_size * num_frames)?;

        Ok(Self {
            buffer,
            aligned_data_size,
            num_frames,
            _marker: PhantomData,
        })
    }

    pub fn offset(&self, frame_index: usize) -> usize {
        self.aligned_data_size * frame_index
    }

    pub fn set_data(&mut self, frame_index: usize, data: &T) -> GpuResult<()> {
        if frame_index >= self.num_frames {
            return Err(GpuError::OutOfBounds {
                offset: self.offset(frame_index),
                len: mem::size_of::<T>(),
                size: self.buffer.size(),
            });
        }
        let offset = self.offset(frame_index);
        self.buffer.write(offset, std::slice::from_ref(data))
    }

    pub fn view(&self, frame_index: usize) -> BufferView {
        let size = mem::size_of::<T>();
        self.buffer.view(self.offset(frame_index), size, size)
    }

    pub fn buffer(&self) -> &UploadBuffer {
        &self.buffer
    }
}
