// Status-Protokoll: JSON-Antwort von GET /status
//
// Nur lesend: der Globus lässt sich über HTTP nicht umkonfigurieren.

use pov_core::{PipelineState, RotationSnapshot};
use serde::Serialize;

use crate::SharedStatus;

/// Ergebnis des letzten Bild-Abrufs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, defmt::Format)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    /// Noch kein Abruf abgeschlossen
    Pending,
    /// Letzter Abruf erfolgreich, Frame neu gerendert
    Ok,
    /// Letzter Abruf fehlgeschlagen, alter Frame bleibt stehen
    Failed,
}

/// Server → Client: Momentaufnahme von Rotor, Pipeline und Abruf
///
/// Beispiel:
/// `{"rotating":true,"period_us":41000,"rpm":1463,"edges":812,"state":"active",...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub rotating: bool,
    pub period_us: Option<u32>,
    pub rpm: Option<u32>,
    pub edges: u32,
    pub state: PipelineState,
    pub phase_offset: usize,
    pub columns_pushed: u32,
    pub blank_frames: u32,
    pub refresh: RefreshStatus,
    pub refresh_count: u32,
    pub uptime_ms: u64,
}

impl StatusReport {
    /// Baut den Report aus Tracker-Snapshot und geteiltem Status
    ///
    /// # Parameter
    /// - `rotation`: frische Kopie des Tracker-Zustands
    /// - `shared`: letzter vom Rotor- und Refresh-Task veröffentlichter Status
    /// - `now_us`: aktuelle Zeit in µs
    pub fn new(rotation: &RotationSnapshot, shared: &SharedStatus, now_us: u64) -> Self {
        Self {
            rotating: rotation.rotating(now_us),
            period_us: rotation.period_us.map(|p| p.get()),
            rpm: rotation.rpm(),
            edges: rotation.edges,
            state: shared.state,
            phase_offset: shared.phase_offset,
            columns_pushed: shared.stats.columns_pushed,
            blank_frames: shared.stats.blank_frames,
            refresh: shared.refresh,
            refresh_count: shared.refresh_count,
            uptime_ms: now_us / 1_000,
        }
    }
}
