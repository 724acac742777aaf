// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Heap für Status-Antworten (picoserve mit "alloc")
extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod regions;
pub mod tasks;
pub mod web;

// Re-exports von pov-core
pub use pov_core::{
    ColumnPipeline, FrameStore, PipelineState, PipelineStats, Renderer, RotationTracker,
};

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::hal::SpiStrip;
use crate::web::protocol::RefreshStatus;

// ============================================================================
// Geteilter Status (Rotor-Task / Refresh-Task → HTTP)
// ============================================================================

/// Letzter veröffentlichter Zustand von Pipeline und Bild-Abruf
#[derive(Debug, Clone, Copy)]
pub struct SharedStatus {
    pub state: PipelineState,
    pub stats: PipelineStats,
    pub phase_offset: usize,
    pub refresh: RefreshStatus,
    pub refresh_count: u32,
}

impl SharedStatus {
    pub const fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            stats: PipelineStats {
                columns_pushed: 0,
                blank_frames: 0,
                coalesced_ticks: 0,
            },
            phase_offset: 0,
            refresh: RefreshStatus::Pending,
            refresh_count: 0,
        }
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Status-Zelle hinter einer Critical Section
///
/// Wird nur kurz zum Kopieren gesperrt, nie über ein `.await` hinweg.
pub type StatusCell = Mutex<CriticalSectionRawMutex, Cell<SharedStatus>>;

/// Ändert den geteilten Status in einem Schritt
pub fn update_status(cell: &StatusCell, f: impl FnOnce(&mut SharedStatus)) {
    cell.lock(|status| {
        let mut current = status.get();
        f(&mut current);
        status.set(current);
    });
}

/// Liest den geteilten Status
pub fn read_status(cell: &StatusCell) -> SharedStatus {
    cell.lock(|status| status.get())
}

// ============================================================================
// Kontext
// ============================================================================

/// Alle langlebigen Zustände der Firmware an einer Stelle
///
/// Wird in `main()` genau einmal in einer `StaticCell` angelegt.
/// Hall-Interrupt und Rotor-Task teilen sich `tracker`, Refresh-Task
/// und Rotor-Task teilen sich `frames` (über Writer/Reader-Handles).
pub struct PovContext {
    pub tracker: RotationTracker,
    pub frames: FrameStore,
    pub status: StatusCell,
}

impl PovContext {
    pub const fn new() -> Self {
        Self {
            tracker: RotationTracker::new(),
            frames: FrameStore::new(),
            status: Mutex::new(Cell::new(SharedStatus::new())),
        }
    }
}

impl Default for PovContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Type-Aliase
// ============================================================================

/// Spalten-Pipeline auf den beiden SPI-DMA Strips
pub type RotorPipeline = ColumnPipeline<'static, SpiStrip>;

/// Renderer mit der festen Regionen-Tabelle
pub type RegionRenderer = Renderer<'static>;
