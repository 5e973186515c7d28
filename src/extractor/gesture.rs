use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GestureState {
    None,
    Enter,
    Stay,
    Exit,
    WaitForConfirm,
}

/// Gesture life-cycle from plane contact to leaving the type zone.
///
/// Once a gesture has exited the extractor stays latched in
/// `WaitForConfirm` until cleared, so a finished gesture cannot restart
/// while its word is pending.
#[derive(Debug, Clone)]
pub struct GestureExtractor {
    state: GestureState,
    active: bool,
}

impl Default for GestureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureExtractor {
    pub fn new() -> Self {
        Self {
            state: GestureState::None,
            active: false,
        }
    }

    pub fn input(&mut self, in_type_zone: bool, touching_plane: bool) -> GestureState {
        if matches!(self.state, GestureState::Exit | GestureState::WaitForConfirm) {
            self.state = GestureState::WaitForConfirm;
            return self.state;
        }

        if !self.active && touching_plane {
            self.active = true;
            self.state = GestureState::Enter;
            return self.state;
        }

        if self.active && !in_type_zone {
            self.active = false;
            self.state = GestureState::Exit;
            return self.state;
        }

        self.state = if self.active {
            GestureState::Stay
        } else {
            GestureState::None
        };
        self.state
    }

    /// Picks up a gesture that is already under way (mixed-mode hand-off).
    pub fn resume(&mut self) {
        self.active = true;
        self.state = GestureState::Stay;
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn clear(&mut self) {
        self.state = GestureState::None;
        self.active = false;
    }
}
