//! Pure Business Logic Functions
//!
//! Funktionen ohne Hardware-Dependencies (testbar!)

use rgb::RGB8;

use crate::types::{LED_COUNT, LedPattern};

/// Parameter für das veränderbare Blink-Intervall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedProfile {
    /// Startwert und Wert nach dem Wraparound
    pub default_ms: u32,
    /// Verkürzung pro Hold/Klick
    pub step_ms: u32,
    /// Untergrenze: wird sie erreicht, springt das Intervall auf `default_ms`
    pub floor_ms: u32,
}

impl SpeedProfile {
    /// Festes Intervall ohne Stufen
    pub const fn fixed(interval_ms: u32) -> Self {
        Self {
            default_ms: interval_ms,
            step_ms: 0,
            floor_ms: 0,
        }
    }
}

/// Berechnet das nächste Intervall nach einem Hold/Klick
///
/// # Beispiele
///
/// ```
/// # use link_core::{SpeedProfile, next_interval};
/// let profile = SpeedProfile { default_ms: 1000, step_ms: 200, floor_ms: 200 };
/// assert_eq!(next_interval(1000, &profile), 800);
/// assert_eq!(next_interval(400, &profile), 1000); // 200 <= Untergrenze
/// ```
pub fn next_interval(current: u32, profile: &SpeedProfile) -> u32 {
    match current.checked_sub(profile.step_ms) {
        Some(next) if next > profile.floor_ms => next,
        _ => profile.default_ms,
    }
}

/// Farbe für die Status-LED: Farbe der leuchtenden LED, sonst aus
///
/// `palette[i]` ist die Farbe der i-ten Anzeige-LED.
pub fn status_color(pattern: LedPattern, palette: &[RGB8; LED_COUNT]) -> RGB8 {
    pattern
        .iter()
        .zip(palette.iter())
        .find(|(on, _)| **on)
        .map(|(_, color)| *color)
        .unwrap_or_default()
}
