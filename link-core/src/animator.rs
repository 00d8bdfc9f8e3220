//! LED-Rotation mit veränderbarem Intervall

use crate::types::LedPhase;

/// Drei-Phasen-Zustandsautomat, getaktet durch eine monotone Uhr
///
/// Ein Schritt erfolgt frühestens `interval_ms` nach dem vorherigen.
/// Verspätete Polls verschieben alle folgenden Schritte (keine
/// Jitter-Korrektur).
#[derive(Debug, Clone, Copy, Default)]
pub struct LedAnimator {
    phase: LedPhase,
    last_step_ms: u64,
}

impl LedAnimator {
    pub const fn new() -> Self {
        Self {
            phase: LedPhase::First,
            last_step_ms: 0,
        }
    }

    pub fn phase(&self) -> LedPhase {
        self.phase
    }

    /// Schaltet weiter, wenn das Intervall abgelaufen ist
    ///
    /// Gibt die neue Phase zurück, sonst `None`.
    pub fn poll(&mut self, now_ms: u64, interval_ms: u32) -> Option<LedPhase> {
        if now_ms.saturating_sub(self.last_step_ms) < u64::from(interval_ms) {
            return None;
        }
        self.last_step_ms = now_ms;
        self.phase = self.phase.next();
        Some(self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_step_before_interval() {
        let mut animator = LedAnimator::new();
        assert_eq!(animator.poll(999, 1000), None);
        assert_eq!(animator.poll(1000, 1000), Some(LedPhase::Second));
    }

    #[test]
    fn test_late_poll_shifts_schedule() {
        let mut animator = LedAnimator::new();
        assert!(animator.poll(1500, 1000).is_some());
        // Nächster Schritt erst 1000 ms nach dem verspäteten
        assert_eq!(animator.poll(2000, 1000), None);
        assert_eq!(animator.poll(2500, 1000), Some(LedPhase::Third));
    }

    #[test]
    fn test_interval_change_applies_to_next_step() {
        let mut animator = LedAnimator::new();
        animator.poll(1000, 1000);
        assert_eq!(animator.poll(1400, 400), Some(LedPhase::Third));
    }
}
