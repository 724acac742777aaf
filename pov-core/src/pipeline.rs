//! Spalten-Pipeline: Echtzeit-Konsument
//!
//! Bei jeder neuen Winkel-Spalte werden zwei Bildspalten (aktuelle und
//! gegenüberliegende) aus dem aktiven Frame gelesen, ins LED-Protokoll
//! kodiert und per Transfer auf die beiden Strips geschoben.
//!
//! ```text
//!  Hall-IRQ ──► RotationTracker ──► tick(now) ──► FrameView ──► StripLane A/B
//!                                      │                          │
//!                                 PhaseOffset                OutputTransfer
//! ```

use crate::config::{
    BRIGHTNESS, COLUMN_BUFFER_SIZE, HORIZONTAL_RESOLUTION, LED_COUNT, PHASE_STEP_US, STRIP_COUNT,
};
use crate::frame::FrameReader;
use crate::rotation::RotationTracker;
use crate::transfer::{ColumnBuffer, OutputTransfer, StripLane};
use crate::wire::{END_FRAME, START_FRAME, encode};

/// Zustand der Pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PipelineState {
    /// Rotor steht, Ausgabe ist dunkel
    Idle,
    /// Rotor dreht, Spalten werden verfolgt
    Active,
}

/// Zähler für Diagnose-Logs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PipelineStats {
    /// Anzahl der ausgegebenen Spalten
    pub columns_pushed: u32,
    /// Anzahl der Dunkel-Frames (Übergänge nach Idle)
    pub blank_frames: u32,
    /// Ticks ohne neue Spalte
    pub coalesced_ticks: u32,
}

/// Langsame Bild-Rotation unabhängig von der Rotor-Drehzahl
///
/// Springt pro `step_us` Mikrosekunden um eine Spalte weiter.
#[derive(Debug, Clone, Copy)]
pub struct PhaseOffset {
    value: usize,
    anchor: Option<u64>,
    step_us: u64,
}

impl PhaseOffset {
    pub const fn new(step_us: u64) -> Self {
        Self {
            value: 0,
            anchor: None,
            step_us,
        }
    }

    /// Zieht den Offset auf den Zeitpunkt `now` nach (O(1), auch nach langen Pausen)
    pub fn advance(&mut self, now: u64) {
        let anchor = *self.anchor.get_or_insert(now);
        if self.step_us == 0 {
            return;
        }
        let steps = now.saturating_sub(anchor) / self.step_us;
        if steps > 0 {
            let steps_mod = (steps % HORIZONTAL_RESOLUTION as u64) as usize;
            self.value = (self.value + steps_mod) % HORIZONTAL_RESOLUTION;
            self.anchor = Some(anchor + steps * self.step_us);
        }
    }

    pub fn value(&self) -> usize {
        self.value
    }
}

/// Frame-Zeile, die LED `led` des Strips `strip` darstellt
///
/// Die beiden Strips sitzen um einen halben LED-Abstand versetzt auf
/// gegenüberliegenden Seiten: Strip 0 zeigt die geraden, Strip 1 die
/// ungeraden Zeilen.
pub const fn strip_row(strip: usize, led: usize) -> usize {
    led * STRIP_COUNT + strip
}

/// Gegenüberliegende Spalte (180° versetzt)
pub const fn opposite_column(column: usize) -> usize {
    (column + HORIZONTAL_RESOLUTION / 2) % HORIZONTAL_RESOLUTION
}

/// Füllt einen Spalten-Buffer
///
/// Index 0 ist der Start-Frame, der letzte Index der End-Frame. LED `i`
/// landet an Index `LED_COUNT - i` (umgekehrte physische Reihenfolge).
pub fn fill_column<B, F>(buffer: &mut B, brightness: u8, color_of: F)
where
    B: ColumnBuffer + ?Sized,
    F: Fn(usize) -> u32,
{
    buffer.put(0, START_FRAME);
    for led in 0..LED_COUNT {
        buffer.put(LED_COUNT - led, encode(color_of(led), brightness));
    }
    buffer.put(COLUMN_BUFFER_SIZE - 1, END_FRAME);
}

/// Spalten-Pipeline für zwei Strips
pub struct ColumnPipeline<'a, T: OutputTransfer> {
    tracker: &'a RotationTracker,
    frames: FrameReader<'a>,
    lanes: [StripLane<T>; STRIP_COUNT],
    state: Option<PipelineState>,
    last_column: Option<usize>,
    phase: PhaseOffset,
    brightness: u8,
    stats: PipelineStats,
}

impl<'a, T: OutputTransfer> ColumnPipeline<'a, T> {
    pub fn new(
        tracker: &'a RotationTracker,
        frames: FrameReader<'a>,
        lanes: [StripLane<T>; STRIP_COUNT],
    ) -> Self {
        Self {
            tracker,
            frames,
            lanes,
            state: None,
            last_column: None,
            phase: PhaseOffset::new(PHASE_STEP_US),
            brightness: BRIGHTNESS,
            stats: PipelineStats::default(),
        }
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    pub fn with_phase_step(mut self, step_us: u64) -> Self {
        self.phase = PhaseOffset::new(step_us);
        self
    }

    /// Ein Durchlauf der Echtzeit-Schleife
    ///
    /// Gibt die ausgegebene Spalte zurück, `None` wenn nichts gepusht wurde.
    pub fn tick(&mut self, now: u64) -> Option<usize> {
        self.phase.advance(now);

        // Eine einzige Critical Section pro Tick
        let snapshot = self.tracker.snapshot();
        let Some(raw) = snapshot.column(now) else {
            self.enter_idle();
            return None;
        };

        if self.state != Some(PipelineState::Active) {
            self.state = Some(PipelineState::Active);
            self.last_column = None;
        }

        let column = (raw + self.phase.value()) % HORIZONTAL_RESOLUTION;
        if self.last_column == Some(column) {
            self.stats.coalesced_ticks = self.stats.coalesced_ticks.wrapping_add(1);
            return None;
        }
        self.last_column = Some(column);

        self.push_column(column);
        Some(column)
    }

    fn push_column(&mut self, column: usize) {
        // Aktiven Buffer einmal pro Tick abtasten
        let view = self.frames.active();
        let sources = [column, opposite_column(column)];
        let brightness = self.brightness;

        for (strip, lane) in self.lanes.iter_mut().enumerate() {
            let x = sources[strip];
            if let Some(buffer) = lane.idle_buffer() {
                fill_column(buffer, brightness, |led| view.pixel(x, strip_row(strip, led)));
            }
            lane.push();
        }
        self.stats.columns_pushed = self.stats.columns_pushed.wrapping_add(1);
    }

    fn enter_idle(&mut self) {
        if self.state == Some(PipelineState::Idle) {
            return;
        }
        self.state = Some(PipelineState::Idle);
        self.last_column = None;

        // Erst alle laufenden Transfers abschließen, dann Buffer anfassen
        for lane in self.lanes.iter_mut() {
            lane.wait_idle();
        }

        let brightness = self.brightness;
        for lane in self.lanes.iter_mut() {
            if let Some(buffer) = lane.idle_buffer() {
                fill_column(buffer, brightness, |_| 0);
            }
            lane.push();
        }
        self.stats.blank_frames = self.stats.blank_frames.wrapping_add(1);
    }

    pub fn state(&self) -> PipelineState {
        self.state.unwrap_or(PipelineState::Idle)
    }

    pub fn phase_offset(&self) -> usize {
        self.phase.value()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn lanes(&self) -> &[StripLane<T>; STRIP_COUNT] {
        &self.lanes
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PipelineState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PipelineState::Idle => defmt::write!(fmt, "Idle"),
            PipelineState::Active => defmt::write!(fmt, "Active"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PipelineStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "PipelineStats {{ columns: {}, blank: {}, coalesced: {} }}",
            self.columns_pushed,
            self.blank_frames,
            self.coalesced_ticks
        )
    }
}
