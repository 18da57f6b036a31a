// Per-tick input signals consumed by the player transition table
//
// Polling hardware and key bindings live outside the core; whatever reads
// the keyboard or gamepad produces one `InputFrame` per simulation tick.

/// Discrete input state for one simulation tick.
///
/// Axes are quantized to -1/0/1. `jump_pressed`, `attack_pressed`, and
/// `dash_pressed` are edge signals (true only on the tick the button went
/// down); `jump_held` is a level signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub horizontal: i8,
    pub vertical: i8,
    pub jump_pressed: bool,
    pub jump_held: bool,
    pub attack_pressed: bool,
    pub dash_pressed: bool,
}

impl InputFrame {
    /// A frame with no input active
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn with_horizontal(mut self, value: i8) -> Self {
        self.horizontal = value.signum();
        self
    }

    pub fn with_vertical(mut self, value: i8) -> Self {
        self.vertical = value.signum();
        self
    }

    pub fn with_jump(mut self) -> Self {
        self.jump_pressed = true;
        self.jump_held = true;
        self
    }

    pub fn holding_jump(mut self) -> Self {
        self.jump_held = true;
        self
    }

    pub fn with_attack(mut self) -> Self {
        self.attack_pressed = true;
        self
    }

    pub fn with_dash(mut self) -> Self {
        self.dash_pressed = true;
        self
    }
}
