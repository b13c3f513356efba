//! Gesture command gate
//!
//! The webcam classifier may shout "lights out" many times a second while
//! a hand is held up. The gate lets one command through per cooldown.

/// Cooldown gate keyed on a millisecond clock
#[derive(Debug, Clone)]
pub struct GestureGate {
    cooldown_ms: f64,
    last_accepted_ms: Option<f64>,
}

impl GestureGate {
    pub fn new(cooldown_ms: f64) -> Self {
        Self {
            cooldown_ms: cooldown_ms.max(0.0),
            last_accepted_ms: None,
        }
    }

    /// True if a command at `now_ms` should go through
    pub fn try_accept(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_accepted_ms {
            if now_ms - last <= self.cooldown_ms {
                return false;
            }
        }
        self.last_accepted_ms = Some(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_gesture_accepted() {
        let mut gate = GestureGate::new(2000.0);
        assert!(gate.try_accept(0.0));
    }

    #[test]
    fn test_cooldown_blocks_repeats() {
        let mut gate = GestureGate::new(2000.0);
        assert!(gate.try_accept(1000.0));
        assert!(!gate.try_accept(1500.0));
        assert!(!gate.try_accept(3000.0));
        assert!(gate.try_accept(3001.0));
        // Rejected attempts do not extend the cooldown
        assert!(gate.try_accept(5002.0));
    }
}
