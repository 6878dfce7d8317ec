//! The per-frame record/submit/present/wait cycle.

use fe_format::{DirectionalLight, Material, TransformationMatrix, VertexData};

use super::{
    input::{EventSource, LoopControl, SceneEditor},
    pipeline::FrameMatrices,
};
use crate::{
    assets::SceneAssets,
    config::EngineConfig,
    error::EngineResult,
    gpu::{
        upload_slice, uploader::Uploader, Command, CommandList, Device, Extent, FrameSync,
        GpuResult, PerFrameBuffer, PipelineLayout, Queue, ResourceState, RootParameter,
        ScissorRect, Surface, Texture, UploadBuffer, Viewport,
    },
    scene::{
        sprite::{SPRITE_INDICES, SPRITE_VERTICES},
        SceneParams,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    RecordingCommands,
    Submitted,
    Presenting,
    WaitingForGpu,
}

impl FrameState {
    pub fn next(self) -> Self {
        match self {
            FrameState::Idle => FrameState::RecordingCommands,
            FrameState::RecordingCommands => FrameState::Submitted,
            FrameState::Submitted => FrameState::Presenting,
            FrameState::Presenting => FrameState::WaitingForGpu,
            FrameState::WaitingForGpu => FrameState::Idle,
        }
    }
}

/// Command list of one slot in the ring of frames in flight.
#[derive(Debug)]
struct FrameResources {
    commands: CommandList,
    /// Counter value of the last submission recorded into `commands`.
    fence_value: u64,
}

/// Constant buffers with one slot per frame in flight.
#[derive(Debug)]
struct SceneBuffers {
    object_transform: PerFrameBuffer<TransformationMatrix>,
    sprite_transform: PerFrameBuffer<TransformationMatrix>,
    object_material: PerFrameBuffer<Material>,
    sprite_material: PerFrameBuffer<Material>,
    light: PerFrameBuffer<DirectionalLight>,
}

impl SceneBuffers {
    fn new<D: Device + ?Sized>(device: &D, frames_in_flight: usize) -> GpuResult<Self> {
        Ok(Self {
            object_transform: PerFrameBuffer::new(device, frames_in_flight)?,
            sprite_transform: PerFrameBuffer::new(device, frames_in_flight)?,
            object_material: PerFrameBuffer::new(device, frames_in_flight)?,
            sprite_material: PerFrameBuffer::new(device, frames_in_flight)?,
            light: PerFrameBuffer::new(device, frames_in_flight)?,
        })
    }
}

/// Geometry and textures uploaded once at startup.
#[derive(Debug)]
struct SceneGeometry {
    model_vertices: UploadBuffer,
    model_vertex_count: u32,
    sprite_vertices: UploadBuffer,
    sprite_indices: UploadBuffer,
    default_texture: Texture,
    model_texture: Option<Texture>,
}

impl SceneGeometry {
    fn upload<D, Q>(
        device: &D,
        queue: &Q,
        sync: &mut FrameSync,
        assets: &SceneAssets,
    ) -> EngineResult<Self>
    where
        D: Device + ?Sized,
        Q: Queue + ?Sized,
    {
        let model_vertices = upload_slice(device, &assets.model.vertices[..])?;
        let sprite_vertices = upload_slice(device, &SPRITE_VERTICES[..])?;
        let sprite_indices = upload_slice(device, &SPRITE_INDICES[..])?;

        let mut uploader = Uploader::new();
        let default_texture = uploader.texture(device, &assets.default_texture)?;
        let model_texture = match &assets.model_texture {
            Some(texture) => Some(uploader.texture(device, texture)?),
            None => None,
        };
        uploader.finish(queue, sync)?;

        Ok(Self {
            model_vertices,
            model_vertex_count: assets.model.vertices.len() as u32,
            sprite_vertices,
            sprite_indices,
            default_texture,
            model_texture,
        })
    }
}

/// Drives one scene object and the overlay sprite through the GPU.
///
/// Every frame writes its constants into the current slot of the ring,
/// records and submits a command list, presents, and signals the frame
/// counter. The loop waits on a slot's last counter value only right before
/// reusing it, so up to `frames_in_flight` frames overlap with the CPU.
pub struct FrameLoop<D: Device, Q: Queue, S: Surface> {
    device: D,
    queue: Q,
    surface: S,
    sync: FrameSync,
    frames: Vec<FrameResources>,
    current_frame: usize,
    buffers: SceneBuffers,
    geometry: SceneGeometry,
    scene: SceneParams,
    clear_color: [f32; 4],
    state: FrameState,
    frame_count: u64,
}

impl<D: Device, Q: Queue, S: Surface> FrameLoop<D, Q, S> {
    pub fn new(
        device: D,
        queue: Q,
        surface: S,
        config: &EngineConfig,
        assets: &SceneAssets,
    ) -> EngineResult<Self> {
        config.validate()?;

        let frames_in_flight = config.render.frames_in_flight;
        let mut sync = FrameSync::new();
        let geometry = SceneGeometry::upload(&device, &queue, &mut sync, assets)?;
        let buffers = SceneBuffers::new(&device, frames_in_flight)?;
        let frames = (0..frames_in_flight)
            .map(|i| FrameResources {
                commands: CommandList::new(format!("frame {}", i)),
                fence_value: 0,
            })
            .collect();

        log::info!(
            "Frame loop ready: {} frames in flight, {} back buffers",
            frames_in_flight,
            surface.back_buffer_count()
        );

        Ok(Self {
            device,
            queue,
            surface,
            sync,
            frames,
            current_frame: 0,
            buffers,
            geometry,
            scene: SceneParams::from_config(config),
            clear_color: config.render.clear_color,
            state: FrameState::Idle,
            frame_count: 0,
        })
    }

    /// Runs frames until `input` asks to quit. Returns the number of frames rendered.
    pub fn run<I>(&mut self, input: &mut I) -> EngineResult<u64>
    where
        I: EventSource + SceneEditor,
    {
        let mut rendered = 0;
        while input.poll() == LoopControl::Continue {
            self.render_frame(input)?;
            rendered += 1;
        }

        log::info!("Quit after {} frames", rendered);
        Ok(rendered)
    }

    /// Renders one frame and returns the counter value signaled for it.
    pub fn render_frame<E: SceneEditor + ?Sized>(&mut self, editor: &mut E) -> EngineResult<u64> {
        self.advance(FrameState::RecordingCommands);

        editor.edit(self.frame_count, &mut self.scene);
        self.scene.light = self.scene.light.renormalized();

        let extent = self.surface.extent();
        let slot = self.current_frame;
        if let Err(error) = self.update_buffers(slot, extent) {
            // nothing was recorded, the slot can be reused
            self.state = FrameState::Idle;
            return Err(error);
        }

        let back_buffer = self.surface.current_back_buffer_index();
        self.record(slot, back_buffer, extent)?;

        self.queue.execute(&self.frames[slot].commands)?;
        self.advance(FrameState::Submitted);

        self.advance(FrameState::Presenting);
        self.surface.present()?;
        let value = self.sync.signal(&self.queue)?;
        self.frames[slot].fence_value = value;

        self.advance(FrameState::WaitingForGpu);
        self.current_frame = (slot + 1) % self.frames.len();
        let next = &mut self.frames[self.current_frame];
        self.sync.wait_until(next.fence_value)?;
        next.commands.reset();

        self.advance(FrameState::Idle);
        self.frame_count += 1;
        Ok(value)
    }

    fn advance(&mut self, to: FrameState) {
        let expected = self.state.next();
        if expected != to {
            log::warn!(
                "Frame state jumps from {:?} to {:?}, expected {:?}",
                self.state,
                to,
                expected
            );
        }
        self.state = to;
    }

    fn update_buffers(&mut self, slot: usize, extent: Extent) -> EngineResult<()> {
        let scene = &self.scene;
        let buffers = &mut self.buffers;
        let matrices = FrameMatrices::new(&scene.camera, extent)?;

        buffers
            .object_transform
            .set_data(slot, &matrices.transformation(&scene.object))?;
        buffers
            .sprite_transform
            .set_data(slot, &matrices.overlay_transformation(&scene.sprite))?;
        buffers
            .object_material
            .set_data(slot, &scene.object_material.to_gpu())?;
        buffers
            .sprite_material
            .set_data(slot, &scene.sprite_material.to_gpu())?;
        buffers.light.set_data(slot, &scene.light)?;
        Ok(())
    }

    fn record(&mut self, slot: usize, back_buffer: usize, extent: Extent) -> GpuResult<()> {
        let buffers = &self.buffers;
        let geometry = &self.geometry;
        let object_texture = match geometry.model_texture {
            Some(texture) if self.scene.use_model_texture => texture,
            _ => geometry.default_texture,
        };

        let mut commands = vec![
            Command::Barrier {
                back_buffer,
                before: ResourceState::Present,
                after: ResourceState::RenderTarget,
            },
            Command::SetRenderTarget {
                back_buffer,
                with_depth: true,
            },
            Command::ClearRenderTarget {
                back_buffer,
                color: self.clear_color,
            },
            Command::ClearDepth(1.0),
            Command::SetViewport(Viewport::full(extent.width, extent.height)),
            Command::SetScissor(ScissorRect::full(extent.width, extent.height)),
            Command::SetPipeline(PipelineLayout::OBJECT_3D),
        ];

        if geometry.model_vertex_count > 0 {
            commands.extend([
                Command::SetVertexBuffer(geometry.model_vertices.view_of::<VertexData>()),
                Command::SetConstantBuffer {
                    parameter: RootParameter::MaterialConstants,
                    view: buffers.object_material.view(slot),
                },
                Command::SetConstantBuffer {
                    parameter: RootParameter::TransformConstants,
                    view: buffers.object_transform.view(slot),
                },
                Command::SetTexture {
                    parameter: RootParameter::TextureTable,
                    texture: object_texture.id,
                },
                Command::SetConstantBuffer {
                    parameter: RootParameter::LightConstants,
                    view: buffers.light.view(slot),
                },
                Command::Draw {
                    vertex_count: geometry.model_vertex_count,
                },
            ]);
        }

        commands.extend([
            Command::SetVertexBuffer(geometry.sprite_vertices.view_of::<VertexData>()),
            Command::SetIndexBuffer(geometry.sprite_indices.view_of::<u32>()),
            Command::SetConstantBuffer {
                parameter: RootParameter::MaterialConstants,
                view: buffers.sprite_material.view(slot),
            },
            Command::SetConstantBuffer {
                parameter: RootParameter::TransformConstants,
                view: buffers.sprite_transform.view(slot),
            },
            Command::SetTexture {
                parameter: RootParameter::TextureTable,
                texture: geometry.default_texture.id,
            },
            Command::SetConstantBuffer {
                parameter: RootParameter::LightConstants,
                view: buffers.light.view(slot),
            },
            Command::DrawIndexed {
                index_count: SPRITE_INDICES.len() as u32,
            },
            Command::Barrier {
                back_buffer,
                before: ResourceState::RenderTarget,
                after: ResourceState::Present,
            },
        ]);

        let list = &mut self.frames[slot].commands;
        for command in commands {
            list.record(command)?;
        }
        list.close();
        Ok(())
    }

    pub fn scene(&self) -> &SceneParams {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneParams {
        &mut self.scene
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn frames_in_flight(&self) -> usize {
        self.frames.len()
    }

    pub fn sync(&self) -> &FrameSync {
        &self.sync
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Blocks until the GPU finished every submitted frame.
    pub fn wait_idle(&self) -> EngineResult<()> {
        Ok(self.sync.wait_idle()?)
    }
}

impl<D: Device, Q: Queue, S: Surface> Drop for FrameLoop<D, Q, S> {
    fn drop(&mut self) {
        if let Err(error) = self.sync.wait_idle() {
            log::error!("Could not wait for the GPU before shutdown: {}", error);
        }
    }
}
