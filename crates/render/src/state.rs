use hellogpu_input::Action;

/// Lowest blend intensity reachable from the keyboard.
pub const MIX_MIN: f32 = 0.1;
/// Highest blend intensity.
pub const MIX_MAX: f32 = 1.0;
/// Blend intensity at startup.
pub const MIX_INITIAL: f32 = 0.2;

/// Per-frame inputs to the draw call that the user can change at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    mix: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self { mix: MIX_INITIAL }
    }
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given intensity, clamped into `[MIX_MIN, MIX_MAX]`.
    pub fn with_mix(mix: f32) -> Self {
        Self {
            mix: mix.clamp(MIX_MIN, MIX_MAX),
        }
    }

    /// How much of the second texture shows through the first.
    pub fn mix(&self) -> f32 {
        self.mix
    }

    /// Apply an input action. Returns whether the state changed.
    pub fn apply(&mut self, action: Action) -> bool {
        let Some(delta) = action.mix_delta() else {
            return false;
        };
        let before = self.mix;
        self.mix += delta;
        if self.mix >= MIX_MAX {
            self.mix = MIX_MAX;
        }
        if self.mix <= MIX_MIN {
            self.mix = MIX_MIN;
        }
        if self.mix != before {
            tracing::debug!(mix = self.mix, "blend intensity changed");
        }
        self.mix != before
    }
}
