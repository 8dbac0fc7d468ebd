/// Step applied to the blend intensity per mix key event.
pub const MIX_STEP: f32 = 0.1;

/// A high-level action produced by keyboard input.
///
/// Render code consumes actions, never raw key events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Show more of the second texture.
    IncreaseMix,
    /// Show more of the first texture.
    DecreaseMix,
    /// Close the window and leave the render loop.
    Quit,
    /// Key with no binding.
    Noop,
}

impl Action {
    /// Signed change to the blend intensity, if this action adjusts it.
    pub fn mix_delta(self) -> Option<f32> {
        match self {
            Action::IncreaseMix => Some(MIX_STEP),
            Action::DecreaseMix => Some(-MIX_STEP),
            Action::Quit | Action::Noop => None,
        }
    }

    pub fn is_quit(self) -> bool {
        matches!(self, Action::Quit)
    }
}
