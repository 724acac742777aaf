// HTTP Server Task - Read-only Status-Endpoint
use alloc::string::String;

use defmt::{info, warn};
use embassy_net::Stack;
use embassy_time::Duration;
use picoserve::response::{IntoResponse, Response, StatusCode};
use picoserve::routing::get;

use crate::config::*;
use crate::hal::now_us;
use crate::web::protocol::StatusReport;
use crate::{PovContext, read_status};

/// HTTP Server Task - läuft parallel zu den anderen Tasks
///
/// Stellt `GET /status` bereit: eine JSON-Momentaufnahme von Rotor,
/// Pipeline und letztem Bild-Abruf. Es gibt bewusst keine Endpunkte,
/// die etwas verändern.
///
/// **Task Pool:** Dieser Task wird `HTTP_TASK_POOL_SIZE`x (2) gespawnt,
/// jede Instanz bedient eine Verbindung gleichzeitig.
///
/// # Parameter
/// - `task_id`: Eindeutige ID für diese Server-Instanz
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `context`: Tracker und geteilter Status
#[embassy_executor::task(pool_size = 2)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    context: &'static PovContext,
) {
    info!("HTTP: Server task {} starting on port {}...", task_id, HTTP_PORT);

    let app = picoserve::Router::new().route(
        "/status",
        get(move || async move { serve_status(context) }),
    );

    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

/// Baut den Status-Report und serialisiert ihn als JSON
fn serve_status(context: &'static PovContext) -> impl IntoResponse {
    let report = StatusReport::new(
        &context.tracker.snapshot(),
        &read_status(&context.status),
        now_us(),
    );

    let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
    let body = match serde_json_core::to_slice(&report, &mut json_buffer) {
        Ok(n) => core::str::from_utf8(&json_buffer[..n])
            .map(String::from)
            .unwrap_or_default(),
        Err(_) => {
            warn!("HTTP: Status report exceeds {} bytes", JSON_STATUS_BUFFER_SIZE);
            String::new()
        }
    };

    let status = if body.is_empty() {
        StatusCode::new(500)
    } else {
        StatusCode::OK
    };
    Response::new(status, body).with_header("Content-Type", "application/json")
}
