use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlinkState {
    pub visible: bool,
}

impl Default for BlinkState {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl BlinkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn alpha(self) -> f32 {
        if self.visible {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlinkSequence {
    state: BlinkState,
}

impl Iterator for BlinkSequence {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let current = self.state.visible;
        self.state.toggle();
        Some(current)
    }
}
