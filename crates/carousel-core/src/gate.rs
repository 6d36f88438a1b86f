//! Interruption gate: tracks whether the user is dragging the carousel

/// Owns the drag flag. Transitions report whether they changed anything so
/// repeated host signals stay harmless.
#[derive(Debug, Clone, Default)]
pub struct InterruptionGate {
    dragging: bool,
}

impl InterruptionGate {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Returns true when this call started the drag
    pub fn begin_drag(&mut self) -> bool {
        let changed = !self.dragging;
        self.dragging = true;
        changed
    }

    /// Returns true when this call ended the drag
    pub fn end_drag(&mut self) -> bool {
        let changed = self.dragging;
        self.dragging = false;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_transitions() {
        let mut gate = InterruptionGate::new();
        assert!(!gate.is_dragging());
        assert!(!gate.end_drag());

        assert!(gate.begin_drag());
        assert!(!gate.begin_drag());
        assert!(gate.is_dragging());

        assert!(gate.end_drag());
        assert!(!gate.is_dragging());
    }
}
