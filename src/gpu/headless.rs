//! Software stand-in for a graphics device.
//!
//! Command lists are replayed on a worker thread acting as the GPU timeline.
//! The timeline reads constant and vertex data at execution time, validates
//! barriers and bindings, and counts hazards: CPU writes into memory that a
//! submission which has not finished yet still references.

use std::{
    collections::{HashMap, VecDeque},
    ops::Range,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Weak,
    },
    thread,
    time::Duration,
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use fe_format::{DirectionalLight, Material, TransformationMatrix};
use parking_lot::Mutex;
use serde::Deserialize;

use super::{
    BufferId, BufferView, Command, CommandList, Device, Extent, Fence, GpuError, GpuResult,
    MappedMemory, PipelineLayout, Queue, ResourceState, RootParameter, Surface, Texture,
    TextureId, UploadBuffer, WriteObserver,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Time the timeline spends on each command list.
    pub gpu_latency_ms: u64,
    pub memory_budget_mb: usize,
    pub back_buffers: usize,
    /// Number of most recent draws kept in [`GpuStats::draw_log`].
    pub draw_log_capacity: usize,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            gpu_latency_ms: 0,
            memory_budget_mb: 256,
            back_buffers: 2,
            draw_log_capacity: 1024,
        }
    }
}

/// What the timeline saw when executing a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub submission: u64,
    pub back_buffer: Option<usize>,
    pub vertex_count: u32,
    pub indexed: bool,
    pub transform: TransformationMatrix,
    pub material: Material,
    pub light: DirectionalLight,
    pub texture: TextureId,
}

#[derive(Debug, Clone, Default)]
pub struct GpuStats {
    pub submissions: u64,
    pub draws: u64,
    pub vertices: u64,
    pub texture_uploads: u64,
    pub hazards: u64,
    pub validation_errors: u64,
    pub last_clear_color: Option<[f32; 4]>,
    pub draw_log: VecDeque<DrawRecord>,
}

#[derive(Debug)]
struct InFlight {
    submission: u64,
    views: Vec<BufferView>,
}

#[derive(Debug)]
struct TextureMemory {
    texture: Texture,
    /// One pixel array per mip level.
    levels: Vec<Vec<u8>>,
}

#[derive(Debug)]
struct Shared {
    next_id: AtomicU64,
    buffers: Mutex<HashMap<BufferId, Weak<MappedMemory>>>,
    textures: Mutex<HashMap<TextureId, TextureMemory>>,
    in_flight: Mutex<Vec<InFlight>>,
    stats: Mutex<GpuStats>,
    device_lost: AtomicBool,
    memory_budget: usize,
    draw_log_capacity: usize,
}

impl Shared {
    fn is_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn memory(&self, id: BufferId) -> Option<Arc<MappedMemory>> {
        self.buffers.lock().get(&id).and_then(Weak::upgrade)
    }

    fn used_memory(&self) -> usize {
        let mut buffers = self.buffers.lock();
        buffers.retain(|_, memory| memory.strong_count() > 0);
        let buffer_bytes: usize = buffers
            .values()
            .filter_map(Weak::upgrade)
            .map(|memory| memory.size())
            .sum();
        let texture_bytes: usize = self
            .textures
            .lock()
            .values()
            .map(|memory| memory.texture.byte_size())
            .sum();
        buffer_bytes + texture_bytes
    }

    fn reserve(&self, requested: usize) -> GpuResult<()> {
        if self.is_lost() {
            return Err(GpuError::DeviceLost);
        }
        let available = self.memory_budget.saturating_sub(self.used_memory());
        if requested > available {
            return Err(GpuError::OutOfMemory {
                requested,
                available,
            });
        }
        Ok(())
    }

    /// Rejects submissions naming buffers or textures the device does not know.
    fn check_handles(&self, list: &CommandList) -> GpuResult<()> {
        {
            let buffers = self.buffers.lock();
            let released = list
                .buffer_views()
                .find(|view| buffers.get(&view.buffer).and_then(Weak::upgrade).is_none());
            if let Some(view) = released {
                return Err(GpuError::InvalidHandle(format!("{:?}", view.buffer)));
            }
        }

        let textures = self.textures.lock();
        for command in list.commands() {
            let texture = match command {
                Command::SetTexture { texture, .. }
                | Command::CopyBufferToTexture { texture, .. } => texture,
                _ => continue,
            };
            if !textures.contains_key(texture) {
                return Err(GpuError::InvalidHandle(format!("{:?}", texture)));
            }
        }
        Ok(())
    }

    fn retire(&self, submission: u64) {
        self.in_flight
            .lock()
            .retain(|in_flight| in_flight.submission != submission);
    }

    /// Memory of a submitted command is gone. Expected once the device is lost,
    /// since nobody waits for the remaining work anymore.
    fn released(&self, buffer: BufferId) {
        if self.is_lost() {
            log::debug!("{:?} released after device loss", buffer);
        } else {
            self.hazard(format_args!("{:?} was released while still referenced", buffer));
        }
    }

    fn hazard(&self, message: std::fmt::Arguments) {
        log::error!("GPU hazard: {}", message);
        self.stats.lock().hazards += 1;
    }

    fn validation_error(&self, submission: u64, message: std::fmt::Arguments) {
        log::error!("Validation error in submission {}: {}", submission, message);
        self.stats.lock().validation_errors += 1;
    }
}

impl WriteObserver for Shared {
    fn cpu_write(&self, buffer: BufferId, range: Range<usize>) {
        let submission = self
            .in_flight
            .lock()
            .iter()
            .find(|in_flight| in_flight.views.iter().any(|v| v.overlaps(buffer, &range)))
            .map(|in_flight| in_flight.submission);

        if let Some(submission) = submission {
            self.hazard(format_args!(
                "CPU wrote bytes {:?} of {:?} still read by submission {}",
                range, buffer, submission
            ));
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    shared: Arc<Shared>,
}

impl HeadlessDevice {
    pub fn new(config: &HeadlessConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                next_id: AtomicU64::new(1),
                buffers: Mutex::new(HashMap::new()),
                textures: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(Vec::new()),
                stats: Mutex::new(GpuStats::default()),
                device_lost: AtomicBool::new(false),
                memory_budget: config.memory_budget_mb * 1024 * 1024,
                draw_log_capacity: config.draw_log_capacity,
            }),
        }
    }

    pub fn stats(&self) -> GpuStats {
        self.shared.stats.lock().clone()
    }

    pub fn used_memory(&self) -> usize {
        self.shared.used_memory()
    }

    /// Pixels of the top mip level.
    pub fn texture_pixels(&self, texture: TextureId) -> Option<Vec<u8>> {
        self.texture_level(texture, 0)
    }

    pub fn texture_level(&self, texture: TextureId, level: u32) -> Option<Vec<u8>> {
        self.shared
            .textures
            .lock()
            .get(&texture)
            .and_then(|memory| memory.levels.get(level as usize))
            .cloned()
    }

    /// Every pending and future wait fails with a device-lost error.
    pub fn simulate_device_lost(&self) {
        log::warn!("Simulating device loss");
        self.shared.device_lost.store(true, Ordering::Release);
    }
}

impl Device for HeadlessDevice {
    fn create_upload_buffer(&self, size: usize) -> GpuResult<UploadBuffer> {
        self.shared.reserve(size)?;

        let id = BufferId(self.shared.next_id());
        let observer: Arc<dyn WriteObserver> = self.shared.clone();
        let memory = Arc::new(MappedMemory::new(id, size, Some(observer)));
        self.shared
            .buffers
            .lock()
            .insert(id, Arc::downgrade(&memory));

        log::trace!("Created upload buffer {:?} ({} bytes)", id, size);
        Ok(UploadBuffer::new(memory))
    }

    fn create_texture(&self, width: u32, height: u32, mip_levels: u32) -> GpuResult<Texture> {
        let texture = Texture {
            id: TextureId(self.shared.next_id()),
            width,
            height,
            mip_levels: mip_levels.max(1),
        };
        self.shared.reserve(texture.byte_size())?;

        let levels = (0..texture.mip_levels)
            .map(|level| vec![0; texture.level_byte_size(level)])
            .collect();
        self.shared
            .textures
            .lock()
            .insert(texture.id, TextureMemory { texture, levels });
        Ok(texture)
    }
}

#[derive(Debug)]
enum Work {
    Execute {
        submission: u64,
        label: String,
        commands: Vec<Command>,
    },
    Signal {
        fence: Arc<Fence>,
        value: u64,
    },
}

/// Submission queue backed by the timeline thread.
#[derive(Debug)]
pub struct HeadlessQueue {
    shared: Arc<Shared>,
    sender: Option<Sender<Work>>,
    worker: Option<thread::JoinHandle<()>>,
    next_submission: AtomicU64,
}

impl HeadlessQueue {
    pub fn new(device: &HeadlessDevice, latency: Duration) -> Self {
        let (sender, receiver) = unbounded();
        let timeline = Timeline {
            shared: device.shared.clone(),
            latency,
            back_buffers: HashMap::new(),
        };
        let worker = thread::Builder::new()
            .name("gpu-timeline".into())
            .spawn(move || timeline.run(receiver))
            .ok();
        if worker.is_none() {
            log::error!("Could not spawn the GPU timeline thread");
        }

        Self {
            shared: device.shared.clone(),
            sender: worker.as_ref().map(|_| sender),
            worker,
            next_submission: AtomicU64::new(1),
        }
    }

    fn send(&self, work: Work) -> GpuResult<()> {
        self.sender
            .as_ref()
            .ok_or(GpuError::QueueShutdown)?
            .send(work)
            .map_err(|_| GpuError::QueueShutdown)
    }
}

impl Queue for HeadlessQueue {
    fn execute(&self, list: &CommandList) -> GpuResult<()> {
        if self.shared.is_lost() {
            return Err(GpuError::DeviceLost);
        }
        if !list.is_closed() {
            return Err(GpuError::CommandListOpen(list.label().to_owned()));
        }
        self.shared.check_handles(list)?;

        let submission = self.next_submission.fetch_add(1, Ordering::Relaxed);
        self.shared.in_flight.lock().push(InFlight {
            submission,
            views: list.buffer_views().copied().collect(),
        });

        let sent = self.send(Work::Execute {
            submission,
            label: list.label().to_owned(),
            commands: list.commands().to_vec(),
        });
        if sent.is_err() {
            self.shared.retire(submission);
        }
        sent
    }

    fn signal(&self, fence: &Arc<Fence>, value: u64) -> GpuResult<()> {
        if self.shared.is_lost() {
            fence.mark_device_lost();
            return Err(GpuError::DeviceLost);
        }
        self.send(Work::Signal {
            fence: fence.clone(),
            value,
        })
    }
}

impl Drop for HeadlessQueue {
    fn drop(&mut self) {
        // closing the channel lets the timeline drain and exit
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("GPU timeline thread panicked");
            }
        }
    }
}

/// State bound while replaying one command list.
#[derive(Debug, Default)]
struct Bindings {
    pipeline: Option<PipelineLayout>,
    render_target: Option<usize>,
    vertex_buffer: Option<BufferView>,
    index_buffer: Option<BufferView>,
    constants: HashMap<RootParameter, BufferView>,
    textures: HashMap<RootParameter, TextureId>,
}

struct Timeline {
    shared: Arc<Shared>,
    latency: Duration,
    back_buffers: HashMap<usize, ResourceState>,
}

impl Timeline {
    fn run(mut self, receiver: Receiver<Work>) {
        for work in receiver.iter() {
            match work {
                Work::Execute {
                    submission,
                    label,
                    commands,
                } => {
                    if !self.latency.is_zero() {
                        thread::sleep(self.latency);
                    }
                    if !self.shared.is_lost() {
                        log::trace!("Executing `{}` (submission {})", label, submission);
                        self.execute(submission, &commands);
                        self.shared.stats.lock().submissions += 1;
                    }
                    self.shared.retire(submission);
                }
                Work::Signal { fence, value } => {
                    if self.shared.is_lost() {
                        fence.mark_device_lost();
                    } else {
                        fence.signal(value);
                    }
                }
            }
        }
        log::debug!("GPU timeline stopped");
    }

    fn back_buffer_state(&self, back_buffer: usize) -> ResourceState {
        self.back_buffers
            .get(&back_buffer)
            .copied()
            .unwrap_or(ResourceState::Present)
    }

    fn execute(&mut self, submission: u64, commands: &[Command]) {
        let mut bindings = Bindings::default();

        for command in commands {
            match command {
                Command::Barrier {
                    back_buffer,
                    before,
                    after,
                } => {
                    let state = self.back_buffer_state(*back_buffer);
                    if state != *before {
                        self.shared.validation_error(
                            submission,
                            format_args!(
                                "back buffer {} is {:?}, barrier expects {:?}",
                                back_buffer, state, before
                            ),
                        );
                    }
                    self.back_buffers.insert(*back_buffer, *after);
                }
                Command::SetRenderTarget { back_buffer, .. } => {
                    self.expect_render_target(submission, *back_buffer);
                    bindings.render_target = Some(*back_buffer);
                }
                Command::ClearRenderTarget { back_buffer, color } => {
                    self.expect_render_target(submission, *back_buffer);
                    self.shared.stats.lock().last_clear_color = Some(*color);
                }
                Command::ClearDepth(_) | Command::SetViewport(_) | Command::SetScissor(_) => {}
                Command::SetPipeline(layout) => bindings.pipeline = Some(*layout),
                Command::SetVertexBuffer(view) => bindings.vertex_buffer = Some(*view),
                Command::SetIndexBuffer(view) => bindings.index_buffer = Some(*view),
                Command::SetConstantBuffer { parameter, view } => {
                    bindings.constants.insert(*parameter, *view);
                }
                Command::SetTexture { parameter, texture } => {
                    bindings.textures.insert(*parameter, *texture);
                }
                Command::Draw { vertex_count } => {
                    self.draw(submission, &bindings, *vertex_count, false);
                }
                Command::DrawIndexed { index_count } => {
                    if self.check_indices(submission, &bindings, *index_count) {
                        self.draw(submission, &bindings, *index_count, true);
                    }
                }
                Command::CopyBufferToTexture {
                    source,
                    texture,
                    mip_level,
                } => {
                    self.copy_to_texture(submission, source, *texture, *mip_level);
                }
            }
        }
    }

    fn expect_render_target(&self, submission: u64, back_buffer: usize) {
        let state = self.back_buffer_state(back_buffer);
        if state != ResourceState::RenderTarget {
            self.shared.validation_error(
                submission,
                format_args!("back buffer {} used as render target while {:?}", back_buffer, state),
            );
        }
    }

    fn read<T: bytemuck::Pod>(&self, view: &BufferView) -> Option<T> {
        match self.shared.memory(view.buffer) {
            Some(memory) => memory.read_pod(view.offset),
            None => {
                self.shared.released(view.buffer);
                None
            }
        }
    }

    fn check_indices(&self, submission: u64, bindings: &Bindings, index_count: u32) -> bool {
        let (index_view, vertex_view) = match (&bindings.index_buffer, &bindings.vertex_buffer) {
            (Some(index_view), Some(vertex_view)) => (index_view, vertex_view),
            _ => {
                self.shared.validation_error(
                    submission,
                    format_args!("indexed draw without index or vertex buffer"),
                );
                return false;
            }
        };

        let indices: Vec<u32> = match self.shared.memory(index_view.buffer) {
            Some(memory) => match memory.read(index_view.range()) {
                Some(bytes) => bytes
                    .chunks_exact(4)
                    .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                    .collect(),
                None => Vec::new(),
            },
            None => {
                self.shared.released(index_view.buffer);
                return false;
            }
        };

        let vertex_count = vertex_view.element_count();
        let valid = indices.len() >= index_count as usize
            && indices[..index_count as usize]
                .iter()
                .all(|index| (*index as usize) < vertex_count);
        if !valid {
            self.shared.validation_error(
                submission,
                format_args!("{} indices out of range of {} vertices", index_count, vertex_count),
            );
        }
        valid
    }

    fn draw(&self, submission: u64, bindings: &Bindings, vertex_count: u32, indexed: bool) {
        let pipeline = match bindings.pipeline {
            Some(pipeline) => pipeline,
            None => {
                self.shared
                    .validation_error(submission, format_args!("draw without pipeline"));
                return;
            }
        };
        let unbound: Vec<&RootParameter> = pipeline
            .parameters
            .iter()
            .filter(|parameter| match parameter {
                RootParameter::TextureTable => !bindings.textures.contains_key(*parameter),
                _ => !bindings.constants.contains_key(*parameter),
            })
            .collect();
        if !unbound.is_empty() || bindings.render_target.is_none() {
            self.shared.validation_error(
                submission,
                format_args!(
                    "draw with unbound parameters {:?} (render target: {:?})",
                    unbound, bindings.render_target
                ),
            );
            return;
        }

        match &bindings.vertex_buffer {
            Some(view) if indexed || view.element_count() >= vertex_count as usize => {
                if self.shared.memory(view.buffer).is_none() {
                    self.shared.released(view.buffer);
                    return;
                }
            }
            _ => {
                self.shared.validation_error(
                    submission,
                    format_args!("draw of {} vertices without enough vertex data", vertex_count),
                );
                return;
            }
        }

        let constants = &bindings.constants;
        let transform = self.read(&constants[&RootParameter::TransformConstants]);
        let material = self.read(&constants[&RootParameter::MaterialConstants]);
        let light = self.read(&constants[&RootParameter::LightConstants]);
        let texture = bindings.textures[&RootParameter::TextureTable];

        if let (Some(transform), Some(material), Some(light)) = (transform, material, light) {
            let mut stats = self.shared.stats.lock();
            stats.draws += 1;
            stats.vertices += vertex_count as u64;
            if self.shared.draw_log_capacity > 0 {
                if stats.draw_log.len() == self.shared.draw_log_capacity {
                    stats.draw_log.pop_front();
                }
                stats.draw_log.push_back(DrawRecord {
                    submission,
                    back_buffer: bindings.render_target,
                    vertex_count,
                    indexed,
                    transform,
                    material,
                    light,
                    texture,
                });
            }
        }
    }

    fn copy_to_texture(
        &self,
        submission: u64,
        source: &BufferView,
        texture: TextureId,
        mip_level: u32,
    ) {
        let memory = match self.shared.memory(source.buffer) {
            Some(memory) => memory,
            None => {
                self.shared.released(source.buffer);
                return;
            }
        };

        let mut textures = self.shared.textures.lock();
        let target = textures
            .get_mut(&texture)
            .and_then(|target| {
                let (width, height) = target.texture.level_extent(mip_level);
                let level = target.levels.get_mut(mip_level as usize)?;
                Some((width, height, level))
            });
        match (target, memory.read(source.range())) {
            (Some((width, height, level)), Some(pixels)) if pixels.len() == level.len() => {
                log::trace!(
                    "Uploaded level {} ({}x{}) of texture {:?}",
                    mip_level,
                    width,
                    height,
                    texture
                );
                *level = pixels;
                drop(textures);
                self.shared.stats.lock().texture_uploads += 1;
            }
            _ => {
                drop(textures);
                self.shared.validation_error(
                    submission,
                    format_args!(
                        "copy into level {} of {:?} does not match its size",
                        mip_level, texture
                    ),
                );
            }
        }
    }
}

/// Swap chain with a configurable number of back buffers.
#[derive(Debug)]
pub struct HeadlessSurface {
    shared: Arc<Shared>,
    extent: Extent,
    back_buffer_count: usize,
    current: usize,
    presents: u64,
}

impl HeadlessSurface {
    pub fn new(device: &HeadlessDevice, extent: Extent, back_buffer_count: usize) -> Self {
        Self {
            shared: device.shared.clone(),
            extent,
            back_buffer_count: back_buffer_count.max(1),
            current: 0,
            presents: 0,
        }
    }

    pub fn present_count(&self) -> u64 {
        self.presents
    }
}

impl Surface for HeadlessSurface {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn back_buffer_count(&self) -> usize {
        self.back_buffer_count
    }

    fn current_back_buffer_index(&self) -> usize {
        self.current
    }

    fn present(&mut self) -> GpuResult<()> {
        if self.shared.is_lost() {
            return Err(GpuError::DeviceLost);
        }
        self.current = (self.current + 1) % self.back_buffer_count;
        self.presents += 1;
        Ok(())
    }
}

/// Device, queue and surface wired to one timeline.
#[derive(Debug)]
pub struct HeadlessBackend {
    pub device: HeadlessDevice,
    pub queue: HeadlessQueue,
    pub surface: HeadlessSurface,
}

impl HeadlessBackend {
    pub fn new(config: &HeadlessConfig, extent: Extent) -> Self {
        let device = HeadlessDevice::new(config);
        let queue = HeadlessQueue::new(&device, Duration::from_millis(config.gpu_latency_ms));
        let surface = HeadlessSurface::new(&device, extent, config.back_buffers);

        Self {
            device,
            queue,
            surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{upload_slice, FrameSync};

    fn backend(latency_ms: u64) -> HeadlessBackend {
        let config = HeadlessConfig {
            gpu_latency_ms: latency_ms,
            ..Default::default()
        };
        HeadlessBackend::new(
            &config,
            Extent {
                width: 64,
                height: 64,
            },
        )
    }

    #[test]
    fn out_of_memory_reports_sizes() {
        let device = HeadlessDevice::new(&HeadlessConfig {
            memory_budget_mb: 1,
            ..Default::default()
        });

        let _kept = device.create_upload_buffer(1024 * 1024 - 16).unwrap();
        let error = device.create_upload_buffer(64).unwrap_err();

        assert_eq!(
            error,
            GpuError::OutOfMemory {
                requested: 64,
                available: 16
            }
        );
        assert!(!error.is_fatal());
    }

    #[test]
    fn dropped_buffers_return_memory() -> GpuResult<()> {
        let device = HeadlessDevice::new(&HeadlessConfig::default());
        let buffer = device.create_upload_buffer(4096)?;
        assert_eq!(device.used_memory(), 4096);

        drop(buffer);
        assert_eq!(device.used_memory(), 0);
        Ok(())
    }

    #[test]
    fn signal_follows_execution() -> GpuResult<()> {
        let backend = backend(20);
        let mut sync = FrameSync::new();

        let mut list = CommandList::new("empty");
        list.close();
        backend.queue.execute(&list)?;
        let value = sync.signal(&backend.queue)?;

        assert_eq!(value, 1);
        sync.wait_until(value).unwrap();
        assert_eq!(backend.device.stats().submissions, 1);
        Ok(())
    }

    #[test]
    fn open_list_is_refused() {
        let backend = backend(0);
        let list = CommandList::new("open");

        assert_eq!(
            backend.queue.execute(&list),
            Err(GpuError::CommandListOpen("open".into()))
        );
    }

    #[test]
    fn write_during_execution_is_a_hazard() -> GpuResult<()> {
        let backend = backend(50);
        let mut sync = FrameSync::new();
        let mut staging = upload_slice(&backend.device, &[0u8; 16])?;
        let texture = backend.device.create_texture(2, 2, 1)?;

        let mut list = CommandList::new("upload");
        list.record(Command::CopyBufferToTexture {
            source: staging.view(0, 16, 1),
            texture: texture.id,
            mip_level: 0,
        })?;
        list.close();
        backend.queue.execute(&list)?;

        staging.write(0, &[1u8; 4])?;
        let value = sync.signal(&backend.queue)?;
        sync.wait_until(value).unwrap();

        // a write after completion is fine
        staging.write(0, &[2u8; 4])?;

        let stats = backend.device.stats();
        assert_eq!(stats.hazards, 1);
        assert_eq!(stats.texture_uploads, 1);
        Ok(())
    }

    #[test]
    fn texture_copy_waited_on_is_clean() -> GpuResult<()> {
        let backend = backend(10);
        let mut sync = FrameSync::new();
        let pixels: Vec<u8> = (0..16).collect();
        let staging = upload_slice(&backend.device, &pixels)?;
        let texture = backend.device.create_texture(2, 2, 1)?;

        let mut list = CommandList::new("upload");
        list.record(Command::CopyBufferToTexture {
            source: staging.view_of::<u8>(),
            texture: texture.id,
            mip_level: 0,
        })?;
        list.close();
        backend.queue.execute(&list)?;
        let value = sync.signal(&backend.queue)?;
        sync.wait_until(value).unwrap();
        drop(staging);

        assert_eq!(backend.device.texture_pixels(texture.id), Some(pixels));
        assert_eq!(backend.device.stats().hazards, 0);
        Ok(())
    }

    #[test]
    fn copies_fill_their_own_mip_level() -> GpuResult<()> {
        let backend = backend(0);
        let mut sync = FrameSync::new();
        let texture = backend.device.create_texture(4, 2, 3)?;
        let staging = upload_slice(&backend.device, &[7u8; 32 + 8 + 4])?;

        let mut list = CommandList::new("upload");
        list.record(Command::CopyBufferToTexture {
            source: staging.view(32, 8, 1),
            texture: texture.id,
            mip_level: 1,
        })?;
        // level 2 is 1x1, so 8 bytes do not fit
        list.record(Command::CopyBufferToTexture {
            source: staging.view(32, 8, 1),
            texture: texture.id,
            mip_level: 2,
        })?;
        list.close();
        backend.queue.execute(&list)?;
        let value = sync.signal(&backend.queue)?;
        sync.wait_until(value).unwrap();

        let device = &backend.device;
        assert_eq!(device.texture_level(texture.id, 0), Some(vec![0; 32]));
        assert_eq!(device.texture_level(texture.id, 1), Some(vec![7; 8]));
        assert_eq!(device.texture_level(texture.id, 2), Some(vec![0; 4]));
        assert_eq!(device.texture_level(texture.id, 3), None);
        assert_eq!(device.stats().texture_uploads, 1);
        assert_eq!(device.stats().validation_errors, 1);
        Ok(())
    }

    #[test]
    fn unknown_handles_are_refused_at_submission() -> GpuResult<()> {
        let backend = backend(0);
        let vertices = upload_slice(&backend.device, &[0u8; 64])?;
        let view = vertices.view_of::<u8>();
        drop(vertices);

        let mut list = CommandList::new("stale");
        list.record(Command::SetVertexBuffer(view))?;
        list.close();
        let error = backend.queue.execute(&list).unwrap_err();
        assert!(matches!(error, GpuError::InvalidHandle(_)));
        assert!(!error.is_fatal());

        let mut list = CommandList::new("unknown texture");
        list.record(Command::SetTexture {
            parameter: RootParameter::TextureTable,
            texture: TextureId(u64::MAX),
        })?;
        list.close();
        assert!(matches!(
            backend.queue.execute(&list),
            Err(GpuError::InvalidHandle(_))
        ));

        assert_eq!(backend.device.stats().submissions, 0);
        assert_eq!(backend.device.stats().hazards, 0);
        Ok(())
    }

    #[test]
    fn barrier_mismatch_is_reported() -> GpuResult<()> {
        let backend = backend(0);
        let mut sync = FrameSync::new();

        let mut list = CommandList::new("bad barrier");
        list.record(Command::Barrier {
            back_buffer: 0,
            before: ResourceState::RenderTarget,
            after: ResourceState::Present,
        })?;
        list.record(Command::ClearRenderTarget {
            back_buffer: 1,
            color: [0.0; 4],
        })?;
        list.close();
        backend.queue.execute(&list)?;
        let value = sync.signal(&backend.queue)?;
        sync.wait_until(value).unwrap();

        assert_eq!(backend.device.stats().validation_errors, 2);
        Ok(())
    }

    #[test]
    fn device_lost_fails_waits() -> GpuResult<()> {
        let backend = backend(30);
        let mut sync = FrameSync::new();

        let mut list = CommandList::new("frame");
        list.close();
        backend.queue.execute(&list)?;
        let value = sync.signal(&backend.queue)?;
        backend.device.simulate_device_lost();

        assert_eq!(
            sync.wait_until(value),
            Err(crate::gpu::SyncError::DeviceLost(value))
        );
        assert_eq!(backend.queue.execute(&list), Err(GpuError::DeviceLost));
        Ok(())
    }

    #[test]
    fn present_rotates_back_buffers() -> GpuResult<()> {
        let mut backend = backend(0);

        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(backend.surface.current_back_buffer_index());
            backend.surface.present()?;
        }

        assert_eq!(seen, vec![0, 1, 0, 1]);
        assert_eq!(backend.surface.present_count(), 4);
        Ok(())
    }
}
