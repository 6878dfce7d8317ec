//! Seams to the windowing and UI collaborators.

use crate::scene::SceneParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Drains pending window events and decides whether the loop keeps running.
pub trait EventSource {
    fn poll(&mut self) -> LoopControl;
}

/// Edits the scene between two frames, as a debug UI would.
pub trait SceneEditor {
    fn edit(&mut self, frame: u64, scene: &mut SceneParams);
}

impl<F> SceneEditor for F
where
    F: FnMut(u64, &mut SceneParams),
{
    fn edit(&mut self, frame: u64, scene: &mut SceneParams) {
        self(frame, scene)
    }
}

type EditFn = Box<dyn FnMut(u64, &mut SceneParams)>;

/// Runs a fixed number of frames, optionally editing the scene every frame.
pub struct ScriptedInput {
    remaining: Option<u64>,
    edit: Option<EditFn>,
}

impl ScriptedInput {
    pub fn frames(count: u64) -> Self {
        Self {
            remaining: Some(count),
            edit: None,
        }
    }

    /// Never asks to quit.
    pub fn endless() -> Self {
        Self {
            remaining: None,
            edit: None,
        }
    }

    pub fn with_edit<F>(mut self, edit: F) -> Self
    where
        F: FnMut(u64, &mut SceneParams) + 'static,
    {
        self.edit = Some(Box::new(edit));
        self
    }
}

impl EventSource for ScriptedInput {
    fn poll(&mut self) -> LoopControl {
        match &mut self.remaining {
            Some(0) => LoopControl::Quit,
            Some(remaining) => {
                *remaining -= 1;
                LoopControl::Continue
            }
            None => LoopControl::Continue,
        }
    }
}

impl SceneEditor for ScriptedInput {
    fn edit(&mut self, frame: u64, scene: &mut SceneParams) {
        if let Some(edit) = &mut self.edit {
            edit(frame, scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_input_quits_after_count() {
        let mut input = ScriptedInput::frames(2);

        assert_eq!(input.poll(), LoopControl::Continue);
        assert_eq!(input.poll(), LoopControl::Continue);
        assert_eq!(input.poll(), LoopControl::Quit);
        assert_eq!(input.poll(), LoopControl::Quit);
    }

    #[test]
    fn edits_receive_the_frame_number() {
        let mut input = ScriptedInput::frames(1).with_edit(|frame, scene| {
            scene.object.translate = crystal::Vec3::new(frame as f32, 0.0, 0.0);
        });
        let mut scene = SceneParams::default();

        input.edit(7, &mut scene);
        assert_eq!(*scene.object.translate.x(), 7.0);
    }
}
