use super::{BufferView, GpuError, GpuResult, PipelineLayout, RootParameter, TextureId};

/// Usage state of a back buffer, switched with [`Command::Barrier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Present,
    RenderTarget,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ScissorRect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Barrier {
        back_buffer: usize,
        before: ResourceState,
        after: ResourceState,
    },
    SetRenderTarget {
        back_buffer: usize,
        with_depth: bool,
    },
    ClearRenderTarget {
        back_buffer: usize,
        color: [f32; 4],
    },
    ClearDepth(f32),
    SetViewport(Viewport),
    SetScissor(ScissorRect),
    SetPipeline(PipelineLayout),
    SetVertexBuffer(BufferView),
    SetIndexBuffer(BufferView),
    SetConstantBuffer {
        parameter: RootParameter,
        view: BufferView,
    },
    SetTexture {
        parameter: RootParameter,
        texture: TextureId,
    },
    Draw {
        vertex_count: u32,
    },
    DrawIndexed {
        index_count: u32,
    },
    CopyBufferToTexture {
        source: BufferView,
        texture: TextureId,
        mip_level: u32,
    },
}

impl Command {
    /// Buffer range read by the GPU when executing this command.
    pub fn buffer_view(&self) -> Option<&BufferView> {
        match self {
            Command::SetVertexBuffer(view)
            | Command::SetIndexBuffer(view)
            | Command::SetConstantBuffer { view, .. }
            | Command::CopyBufferToTexture { source: view, .. } => Some(view),
            _ => None,
        }
    }
}

/// Commands recorded on the CPU, replayed by a [`Queue`](super::Queue).
///
/// A list is recorded, closed, submitted and, once the GPU is done with it,
/// reset for the next use.
#[derive(Debug, Clone)]
pub struct CommandList {
    label: String,
    commands: Vec<Command>,
    closed: bool,
}

impl CommandList {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
            closed: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn record(&mut self, command: Command) -> GpuResult<()> {
        if self.closed {
            return Err(GpuError::CommandListClosed(self.label.clone()));
        }
        self.commands.push(command);
        Ok(())
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn reset(&mut self) {
        self.commands.clear();
        self.closed = false;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn buffer_views(&self) -> impl Iterator<Item = &BufferView> + '_ {
        self.commands.iter().filter_map(Command::buffer_view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_list_refuses_commands() {
        let mut list = CommandList::new("frame 0");
        list.record(Command::ClearDepth(1.0)).unwrap();
        list.close();

        assert_eq!(
            list.record(Command::ClearDepth(1.0)),
            Err(GpuError::CommandListClosed("frame 0".into()))
        );

        list.reset();
        assert!(!list.is_closed());
        assert!(list.commands().is_empty());
        assert!(list.record(Command::ClearDepth(1.0)).is_ok());
    }
}
