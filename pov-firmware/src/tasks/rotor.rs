// Rotor Task - Echtzeit-Schleife der Spalten-Pipeline
use defmt::info;
use embassy_futures::yield_now;

use crate::config::STATS_INTERVAL_SECS;
use crate::hal::now_us;
use crate::{RotationTracker, RotorPipeline, StatusCell, update_status};

/// Rotor Task - tickt die Pipeline so oft wie möglich
///
/// Jeder Durchlauf:
/// - fragt den RotationTracker nach der aktuellen Spalte
/// - schiebt bei neuer Spalte zwei Bildspalten auf die Strips
/// - gibt danach kurz an den Executor ab (`yield_now`), damit
///   WiFi, Refresh und HTTP weiterlaufen
///
/// Geloggt werden nur Zustandswechsel und periodisch die Statistik,
/// nie einzelne Spalten.
///
/// # Parameter
/// - `pipeline`: fertig verdrahtete Pipeline (Tracker, FrameReader, zwei Strips)
/// - `tracker`: derselbe Tracker, für die Drehzahl im Statistik-Log
/// - `status`: geteilter Status für den HTTP-Server
#[embassy_executor::task]
pub async fn rotor_task(
    mut pipeline: RotorPipeline,
    tracker: &'static RotationTracker,
    status: &'static StatusCell,
) -> ! {
    info!("Rotor: Pipeline started");

    let stats_interval = STATS_INTERVAL_SECS * 1_000_000;
    let mut last_state = None;
    let mut last_report = now_us();

    loop {
        let now = now_us();
        pipeline.tick(now);

        let state = pipeline.state();
        if last_state != Some(state) {
            info!("Rotor: {}", state);
            last_state = Some(state);
            publish(&pipeline, status);
        }

        if now.saturating_sub(last_report) >= stats_interval {
            last_report = now;
            let rotation = tracker.snapshot();
            info!(
                "Rotor: {} rpm={} phase={} {}",
                state,
                rotation.rpm(),
                pipeline.phase_offset(),
                pipeline.stats()
            );
            publish(&pipeline, status);
        }

        yield_now().await;
    }
}

/// Schreibt Zustand und Zähler der Pipeline in den geteilten Status
fn publish(pipeline: &RotorPipeline, status: &StatusCell) {
    update_status(status, |shared| {
        shared.state = pipeline.state();
        shared.stats = pipeline.stats();
        shared.phase_offset = pipeline.phase_offset();
    });
}
