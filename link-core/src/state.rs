//! Geteilter Geräte-Zustand
//!
//! Wird zwischen Interrupt-Handler, Main-Loop und HTTP-Tasks geteilt.
//! Jede Zelle ist ein einzelnes Atomic, daher ohne Locks in `static`s nutzbar.
//! Zeitstempel sind `u32` Millisekunden (wrapping), damit der ISR ohne
//! 64-Bit-Atomics auskommt.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::logic::{SpeedProfile, next_interval};
use crate::types::{Direction, LedPhase, NodeKind, NodeStatus};

/// Blink-Intervall mit festem Schritt-Profil
pub struct SpeedSetting {
    interval_ms: AtomicU32,
    profile: SpeedProfile,
}

impl SpeedSetting {
    pub const fn new(profile: SpeedProfile) -> Self {
        Self {
            interval_ms: AtomicU32::new(profile.default_ms),
            profile,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms.load(Ordering::Relaxed)
    }

    /// Verkürzt das Intervall um einen Schritt und gibt den neuen Wert zurück
    pub fn step_down(&self) -> u32 {
        let profile = self.profile;
        let previous = self
            .interval_ms
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(next_interval(current, &profile))
            })
            .unwrap_or_else(|current| current);
        next_interval(previous, &profile)
    }
}

/// Laufrichtung (Device 2)
pub struct DirectionFlag {
    reversed: AtomicBool,
}

impl DirectionFlag {
    pub const fn new() -> Self {
        Self {
            reversed: AtomicBool::new(false),
        }
    }

    pub fn get(&self) -> Direction {
        Direction::from_reversed(self.reversed.load(Ordering::Relaxed))
    }

    /// Kehrt die Richtung um und gibt die neue Richtung zurück
    pub fn toggle(&self) -> Direction {
        let previous = self.reversed.fetch_xor(true, Ordering::Relaxed);
        Direction::from_reversed(!previous)
    }
}

impl Default for DirectionFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Button-Zustand zwischen ISR und Main-Loop
///
/// Der ISR schreibt nur `record_press`; alles andere läuft im Main-Loop.
/// `press` packt Zeitstempel und Pending-Bit in ein Wort: Bit 0 = Druck
/// noch nicht ausgewertet, Bits 1..31 = Zeitstempel (auf gerade ms gerundet).
pub struct ButtonLatch {
    press: AtomicU32,
    edges: AtomicU32,
    held: AtomicBool,
}

const PRESS_PENDING: u32 = 1;

impl ButtonLatch {
    pub const fn new() -> Self {
        Self {
            press: AtomicU32::new(0),
            edges: AtomicU32::new(0),
            held: AtomicBool::new(false),
        }
    }

    /// Fallende Flanke gesehen (ISR-Kontext)
    pub fn record_press(&self, now_ms: u32) {
        self.edges.fetch_add(1, Ordering::AcqRel);
        self.press.store(now_ms | PRESS_PENDING, Ordering::Release);
    }

    /// Hold von außen anfordern (z.B. `On` vom Partner-Gerät)
    pub fn request_hold(&self) {
        self.held.store(true, Ordering::Release);
    }

    /// Prüft auf einen Hold und konsumiert ihn
    ///
    /// Ein Druck wird nach `hold_ms` ausgewertet: ist der Button dann noch
    /// gedrückt, zählt er als Hold. Pro Druck höchstens ein Hold.
    pub fn poll_hold(&self, now_ms: u32, still_low: bool, hold_ms: u32) -> bool {
        let word = self.press.load(Ordering::Acquire);
        if word & PRESS_PENDING != 0
            && now_ms.wrapping_sub(word & !PRESS_PENDING) >= hold_ms
            && self.clear_pending(word)
            && still_low
        {
            self.held.store(true, Ordering::Relaxed);
        }
        self.held.swap(false, Ordering::AcqRel)
    }

    /// Löscht das Pending-Bit nur, wenn seit `seen` kein neuer Druck kam
    fn clear_pending(&self, seen: u32) -> bool {
        self.press
            .compare_exchange(seen, seen & !PRESS_PENDING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Konsumiert alle seit dem letzten Aufruf gezählten Flanken (Device 2)
    pub fn take_presses(&self) -> u32 {
        self.edges.swap(0, Ordering::AcqRel)
    }
}

impl Default for ButtonLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Zuletzt angezeigte LED-Phase (für `GET /status`)
pub struct PhaseCell {
    index: AtomicU8,
}

impl PhaseCell {
    pub const fn new() -> Self {
        Self {
            index: AtomicU8::new(0),
        }
    }

    pub fn get(&self) -> LedPhase {
        LedPhase::from_index(self.index.load(Ordering::Relaxed) as usize)
    }

    pub fn set(&self, phase: LedPhase) {
        self.index.store(phase.index() as u8, Ordering::Relaxed);
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Was der Button-Interrupt auslöst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonMode {
    /// Device 1: Zeitstempel merken, Main-Loop erkennt Hold
    Hold,
    /// Device 2: Richtung sofort umkehren, Main-Loop benachrichtigt Partner
    ToggleDirection,
}

/// Gesamter geteilter Zustand eines Geräts
pub struct SharedState {
    pub kind: NodeKind,
    pub button_mode: ButtonMode,
    pub speed: SpeedSetting,
    pub direction: DirectionFlag,
    pub button: ButtonLatch,
    pub phase: PhaseCell,
}

impl SharedState {
    pub const fn new(kind: NodeKind, button_mode: ButtonMode, profile: SpeedProfile) -> Self {
        Self {
            kind,
            button_mode,
            speed: SpeedSetting::new(profile),
            direction: DirectionFlag::new(),
            button: ButtonLatch::new(),
            phase: PhaseCell::new(),
        }
    }

    /// Kompletter Rumpf des Button-Interrupts
    pub fn button_edge(&self, now_ms: u32) {
        if self.button_mode == ButtonMode::ToggleDirection {
            self.direction.toggle();
        }
        self.button.record_press(now_ms);
    }

    /// Momentaufnahme für `GET /status`
    pub fn status(&self) -> NodeStatus {
        NodeStatus {
            node: self.kind,
            phase: self.phase.get().index() as u8,
            interval_ms: self.speed.interval_ms(),
            reversed: self.direction.get().is_reversed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: SpeedProfile = SpeedProfile {
        default_ms: 1000,
        step_ms: 200,
        floor_ms: 200,
    };

    #[test]
    fn test_step_down_wraps_to_default() {
        let speed = SpeedSetting::new(PROFILE);
        assert_eq!(speed.step_down(), 800);
        assert_eq!(speed.step_down(), 600);
        assert_eq!(speed.step_down(), 400);
        assert_eq!(speed.step_down(), 1000);
        assert_eq!(speed.interval_ms(), 1000);
    }

    #[test]
    fn test_hold_requires_threshold() {
        let latch = ButtonLatch::new();
        latch.record_press(5_000);
        assert!(!latch.poll_hold(5_999, true, 1000));
        assert!(latch.poll_hold(6_000, true, 1000));
        // Ein Druck = ein Hold
        assert!(!latch.poll_hold(9_000, true, 1000));
    }

    #[test]
    fn test_released_before_threshold_is_no_hold() {
        let latch = ButtonLatch::new();
        latch.record_press(100);
        assert!(!latch.poll_hold(1_200, false, 1000));
        assert!(!latch.poll_hold(2_500, true, 1000));
    }

    #[test]
    fn test_hold_survives_timer_wrap() {
        let latch = ButtonLatch::new();
        latch.record_press(u32::MAX - 10);
        assert!(latch.poll_hold(1_000, true, 1000));
    }

    #[test]
    fn test_toggle_mode_flips_direction_in_isr() {
        let state = SharedState::new(NodeKind::Direction, ButtonMode::ToggleDirection, PROFILE);
        state.button_edge(10);
        assert_eq!(state.direction.get(), Direction::Reverse);
        assert_eq!(state.button.take_presses(), 1);
        assert_eq!(state.button.take_presses(), 0);
    }

    #[test]
    fn test_every_edge_is_counted() {
        let state = SharedState::new(NodeKind::Direction, ButtonMode::ToggleDirection, PROFILE);
        state.button_edge(100);
        state.button_edge(105);
        // Zwei Umkehrungen: wieder vorwärts, aber zwei Flanken gezählt
        assert_eq!(state.direction.get(), Direction::Forward);
        assert_eq!(state.button.take_presses(), 2);
        assert_eq!(state.button.take_presses(), 0);
    }

    #[test]
    fn test_new_press_survives_stale_clear() {
        let latch = ButtonLatch::new();
        latch.record_press(100);
        let seen = latch.press.load(Ordering::Acquire);

        // ISR kommt zwischen Laden und Löschen dazwischen
        latch.record_press(1_150);
        assert!(!latch.clear_pending(seen));

        // Der neue Druck ist weiterhin offen und wird ab 2_150 ausgewertet
        assert!(!latch.poll_hold(2_149, true, 1000));
        assert!(latch.poll_hold(2_150, true, 1000));
    }

    #[test]
    fn test_repress_after_release_still_counts() {
        let latch = ButtonLatch::new();
        latch.record_press(0);
        assert!(!latch.poll_hold(1_000, false, 1000));

        latch.record_press(1_010);
        assert!(!latch.poll_hold(1_500, true, 1000));
        assert!(latch.poll_hold(2_010, true, 1000));
    }
}
