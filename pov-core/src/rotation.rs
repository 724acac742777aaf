//! Rotations-Messung über den Hall-Sensor
//!
//! Der Hall-Sensor liefert einmal pro Umdrehung eine fallende Flanke.
//! `on_edge()` läuft im Interrupt-Kontext, `rotating()` und `column()`
//! werden aus der Echtzeit-Schleife gepollt. Der gemeinsame Zustand liegt
//! hinter einer Critical Section, die nur für das Kopieren der Skalare
//! gehalten wird.

use core::cell::RefCell;
use core::num::NonZeroU32;

use critical_section::Mutex;

use crate::config::{HORIZONTAL_RESOLUTION, ROTATION_WINDOW, STILLNESS_THRESHOLD_US};

/// Ringpuffer der letzten Umdrehungsdauern
///
/// Die laufende Summe hält `record()` und `period()` in O(1).
struct TrackerState {
    deltas: [u32; ROTATION_WINDOW],
    head: usize,
    filled: usize,
    sum: u64,
    last_edge: Option<u64>,
    edges: u32,
}

impl TrackerState {
    const fn new() -> Self {
        Self {
            deltas: [0; ROTATION_WINDOW],
            head: 0,
            filled: 0,
            sum: 0,
            last_edge: None,
            edges: 0,
        }
    }

    fn record(&mut self, now: u64) {
        if let Some(last) = self.last_edge {
            let dt = now.saturating_sub(last);
            if dt >= STILLNESS_THRESHOLD_US {
                // Rotor stand still: alte Messwerte verwerfen, neu einschwingen
                self.reset_window();
            } else {
                let dt = dt as u32;
                if self.filled == ROTATION_WINDOW {
                    self.sum -= u64::from(self.deltas[self.head]);
                } else {
                    self.filled += 1;
                }
                self.deltas[self.head] = dt;
                self.sum += u64::from(dt);
                self.head = (self.head + 1) % ROTATION_WINDOW;
            }
        }
        self.last_edge = Some(now);
        self.edges = self.edges.wrapping_add(1);
    }

    fn reset_window(&mut self) {
        self.deltas = [0; ROTATION_WINDOW];
        self.head = 0;
        self.filled = 0;
        self.sum = 0;
    }

    fn period(&self) -> Option<NonZeroU32> {
        if self.filled == 0 {
            return None;
        }
        NonZeroU32::new((self.sum / self.filled as u64) as u32)
    }
}

/// Kopie des Tracker-Zustands zu einem Zeitpunkt
///
/// Alle Berechnungen laufen auf dieser Kopie, außerhalb der Critical Section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RotationSnapshot {
    /// Zeitstempel der letzten Flanke in µs
    pub last_edge: Option<u64>,
    /// Geglättete Umdrehungsdauer in µs
    pub period_us: Option<NonZeroU32>,
    /// Anzahl der bisher gesehenen Flanken
    pub edges: u32,
}

impl RotationSnapshot {
    /// Dreht sich der Rotor schnell genug für eine Darstellung?
    ///
    /// Neben der geglätteten Periode wird auch der Abstand zur letzten
    /// Flanke geprüft, damit ein gerade stehengebliebener Rotor nicht mit
    /// einer veralteten Periode weiter als drehend gilt.
    pub fn rotating(&self, now: u64) -> bool {
        match (self.last_edge, self.period_us) {
            (Some(last), Some(period)) => {
                u64::from(period.get()) < STILLNESS_THRESHOLD_US
                    && now.saturating_sub(last) < STILLNESS_THRESHOLD_US
            }
            _ => false,
        }
    }

    /// Aktuelle Winkel-Spalte, `None` wenn der Rotor nicht dreht
    pub fn column(&self, now: u64) -> Option<usize> {
        if !self.rotating(now) {
            return None;
        }
        let last = self.last_edge?;
        let period = self.period_us?;
        column_at(now, last, period.get(), HORIZONTAL_RESOLUTION)
    }

    /// Umdrehungen pro Minute (nur für Diagnose)
    pub fn rpm(&self) -> Option<u32> {
        self.period_us.map(|period| 60_000_000 / period.get())
    }
}

/// Berechnet die Winkel-Spalte aus Zeit seit der letzten Flanke und Periode
///
/// `column = floor(elapsed * resolution / period) mod resolution`
///
/// ```
/// # use pov_core::rotation::column_at;
/// assert_eq!(column_at(500, 0, 1000, 120), Some(60));
/// ```
pub fn column_at(now: u64, last_edge: u64, period_us: u32, resolution: usize) -> Option<usize> {
    if period_us == 0 || resolution == 0 {
        return None;
    }
    let elapsed = now.saturating_sub(last_edge);
    let column = elapsed.saturating_mul(resolution as u64) / u64::from(period_us);
    Some((column % resolution as u64) as usize)
}

/// Rotations-Tracker
///
/// Wird einmal statisch angelegt und per `&'static` an Interrupt-Handler
/// und Echtzeit-Task verteilt.
pub struct RotationTracker {
    state: Mutex<RefCell<TrackerState>>,
}

impl RotationTracker {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(TrackerState::new())),
        }
    }

    /// Verarbeitet eine Hall-Flanke (Interrupt-Kontext, O(1), blockiert nicht)
    pub fn on_edge(&self, now: u64) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).record(now));
    }

    /// Kopiert den aktuellen Zustand aus der Critical Section
    pub fn snapshot(&self) -> RotationSnapshot {
        critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            RotationSnapshot {
                last_edge: state.last_edge,
                period_us: state.period(),
                edges: state.edges,
            }
        })
    }

    pub fn rotating(&self, now: u64) -> bool {
        self.snapshot().rotating(now)
    }

    /// Aktuelle Winkel-Spalte
    ///
    /// Gibt `None` zurück solange `rotating()` falsch ist, statt mit einer
    /// undefinierten Periode zu rechnen.
    pub fn column(&self, now: u64) -> Option<usize> {
        self.snapshot().column(now)
    }
}

impl Default for RotationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RotationSnapshot {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "RotationSnapshot {{ period_us: {}, edges: {} }}",
            self.period_us.map(|p| p.get()),
            self.edges
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin(tracker: &RotationTracker, start: u64, period: u64, edges: u64) -> u64 {
        let mut now = start;
        for _ in 0..edges {
            tracker.on_edge(now);
            now += period;
        }
        now - period
    }

    #[test]
    fn test_no_edge_is_not_rotating() {
        let tracker = RotationTracker::new();
        assert!(!tracker.rotating(0));
        assert_eq!(tracker.column(0), None);
        assert_eq!(tracker.snapshot().period_us, None);
    }

    #[test]
    fn test_single_edge_has_no_period() {
        let tracker = RotationTracker::new();
        tracker.on_edge(1_000);
        assert!(!tracker.rotating(1_500));
        assert_eq!(tracker.snapshot().edges, 1);
    }

    #[test]
    fn test_period_is_mean_of_deltas() {
        let tracker = RotationTracker::new();
        tracker.on_edge(0);
        tracker.on_edge(10_000);
        tracker.on_edge(30_000);
        let period = tracker.snapshot().period_us.unwrap().get();
        assert_eq!(period, 15_000);
    }

    #[test]
    fn test_window_drops_oldest_delta() {
        let tracker = RotationTracker::new();
        let last = spin(&tracker, 0, 40_000, ROTATION_WINDOW as u64 + 1);
        // Ab jetzt nur noch 20 ms Umdrehungen → Mittelwert wandert auf 20 ms
        spin(&tracker, last + 20_000, 20_000, ROTATION_WINDOW as u64);
        assert_eq!(tracker.snapshot().period_us.unwrap().get(), 20_000);
    }

    #[test]
    fn test_column_at_half_period() {
        assert_eq!(column_at(500, 0, 1000, 120), Some(60));
    }

    #[test]
    fn test_column_at_wraps() {
        assert_eq!(column_at(1_500, 0, 1000, 120), Some(60));
    }

    #[test]
    fn test_column_at_zero_period() {
        assert_eq!(column_at(500, 0, 0, 120), None);
    }

    #[test]
    fn test_rotating_and_column() {
        let tracker = RotationTracker::new();
        let last = spin(&tracker, 0, 12_000, 4);
        assert!(tracker.rotating(last + 6_000));
        assert_eq!(tracker.column(last + 6_000), Some(60));
        assert_eq!(tracker.column(last + 100), Some(1));
    }

    #[test]
    fn test_gap_beyond_threshold_stops_rotation() {
        let tracker = RotationTracker::new();
        let last = spin(&tracker, 0, 12_000, 8);
        assert!(!tracker.rotating(last + STILLNESS_THRESHOLD_US));
        assert_eq!(tracker.column(last + STILLNESS_THRESHOLD_US), None);
    }

    #[test]
    fn test_slow_rotor_is_not_rotating() {
        let tracker = RotationTracker::new();
        spin(&tracker, 0, 99_000, 3);
        // 99 ms < Schwelle → dreht noch
        assert!(tracker.rotating(198_000 + 1_000));

        let slow = RotationTracker::new();
        spin(&slow, 0, 150_000, 3);
        assert!(!slow.rotating(300_000 + 1_000));
    }

    #[test]
    fn test_restart_after_stop_discards_stale_period() {
        let tracker = RotationTracker::new();
        let last = spin(&tracker, 0, 10_000, 10);
        // Lange Pause, dann erste Flanke nach dem Neustart
        tracker.on_edge(last + 5_000_000);
        assert_eq!(tracker.snapshot().period_us, None);
        assert!(!tracker.rotating(last + 5_000_100));

        tracker.on_edge(last + 5_030_000);
        assert_eq!(tracker.snapshot().period_us.unwrap().get(), 30_000);
    }

    #[test]
    fn test_rpm() {
        let tracker = RotationTracker::new();
        spin(&tracker, 0, 50_000, 3);
        assert_eq!(tracker.snapshot().rpm(), Some(1200));
    }
}
