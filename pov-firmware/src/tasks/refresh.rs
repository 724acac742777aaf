// Refresh Task - Holt das Regionen-Bitmap und rendert den Frame neu
use core::fmt::Write as _;

use defmt::{Debug2Format, info, warn};
use embassy_net::{IpAddress, Ipv4Address, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};
use heapless::String;
use pov_core::config::REGION_COUNT;
use pov_core::{PayloadError, RegionFlags, parse_response};

use crate::config::*;
use crate::web::protocol::RefreshStatus;
use crate::{RegionRenderer, StatusCell, update_status};

/// Refresh Task - läuft unabhängig von der Echtzeit-Schleife
///
/// Dieser Task übernimmt das Bild-Update:
/// - Malt beim Start alle Regionen inaktiv (Globus zeigt das Raster)
/// - Wartet auf Netzwerk-Verbindung
/// - Fragt alle `REFRESH_INTERVAL_SECS` das Bitmap vom Bild-Server ab
/// - Rendert bei gültiger Antwort in den freien Frame-Buffer
/// - Bei Fehlern bleibt der alte Frame stehen
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `renderer`: Renderer mit exklusivem Schreibzugriff auf den Frame Store
/// - `status`: geteilter Status für den HTTP-Server
#[embassy_executor::task]
pub async fn refresh_task(
    stack: &'static Stack<'static>,
    mut renderer: RegionRenderer,
    status: &'static StatusCell,
) {
    renderer.render(&[false; REGION_COUNT]);
    info!("Refresh: Rendered {} inactive regions", renderer.region_count());

    info!("Refresh: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!(
        "Refresh: Network ready, polling http://{}:{}{}",
        IMAGE_HOST, IMAGE_PORT, IMAGE_PATH
    );

    let mut last_flags = None;
    loop {
        match fetch_flags(stack).await {
            Ok(flags) => {
                if last_flags != Some(flags) {
                    info!(
                        "Refresh: {} of {} regions active",
                        flags.iter().filter(|&&active| active).count(),
                        REGION_COUNT
                    );
                    last_flags = Some(flags);
                }
                renderer.render(&flags);
                update_status(status, |shared| {
                    shared.refresh = RefreshStatus::Ok;
                    shared.refresh_count = shared.refresh_count.wrapping_add(1);
                });
            }
            Err(e) => {
                warn!("Refresh: Fetch failed: {}", e);
                update_status(status, |shared| shared.refresh = RefreshStatus::Failed);
            }
        }
        Timer::after(Duration::from_secs(REFRESH_INTERVAL_SECS)).await;
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
///
/// Prüft kontinuierlich Link-Status und DHCP-Konfiguration.
async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// Ein kompletter Abruf: DNS, TCP, GET, Antwort lesen, parsen
///
/// Jeder Abruf nutzt eine frische Verbindung (HTTP/1.0, `Connection: close`),
/// das Ende der Antwort ist das Schließen durch den Server.
async fn fetch_flags(stack: &'static Stack<'static>) -> Result<RegionFlags, FetchError> {
    let server_ip = resolve_hostname(stack, IMAGE_HOST).await?;

    let mut rx_buffer = [0u8; FETCH_TCP_BUFFER_SIZE];
    let mut tx_buffer = [0u8; FETCH_TCP_BUFFER_SIZE];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(FETCH_TIMEOUT_SECS)));

    socket
        .connect((server_ip, IMAGE_PORT))
        .await
        .map_err(|_| FetchError::ConnectionFailed)?;

    let mut request: String<REQUEST_BUFFER_SIZE> = String::new();
    write!(
        request,
        "GET {} HTTP/1.0\r\nHost: {}\r\nConnection: close\r\n\r\n",
        IMAGE_PATH, IMAGE_HOST
    )
    .map_err(|_| FetchError::RequestTooLarge)?;

    let mut remaining = request.as_bytes();
    while !remaining.is_empty() {
        let written = socket
            .write(remaining)
            .await
            .map_err(|_| FetchError::WriteFailed)?;
        if written == 0 {
            return Err(FetchError::WriteFailed);
        }
        remaining = &remaining[written..];
    }

    let mut response = [0u8; RESPONSE_BUFFER_SIZE];
    let mut len = 0;
    loop {
        if len == response.len() {
            socket.abort();
            return Err(FetchError::ResponseTooLarge);
        }
        match socket.read(&mut response[len..]).await {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(_) => return Err(FetchError::ReadFailed),
        }
    }
    socket.close();

    parse_response(&response[..len]).map_err(FetchError::Payload)
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<Ipv4Address, FetchError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => {
            for addr in addrs {
                if let IpAddress::Ipv4(ipv4) = addr {
                    return Ok(ipv4);
                }
            }
            Err(FetchError::DnsResolutionFailed)
        }
        Ok(Err(e)) => {
            warn!("Refresh: DNS error: {}", Debug2Format(&e));
            Err(FetchError::DnsResolutionFailed)
        }
        Err(_) => Err(FetchError::DnsTimeout),
    }
}

/// Refresh Fehler-Typen
///
/// Alle möglichen Fehler eines Abrufs. Jeder Fehler lässt den alten
/// Frame stehen, der nächste Versuch kommt nach `REFRESH_INTERVAL_SECS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    RequestTooLarge,
    WriteFailed,
    ReadFailed,
    ResponseTooLarge,
    Payload(PayloadError),
}

impl defmt::Format for FetchError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FetchError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            FetchError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            FetchError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            FetchError::RequestTooLarge => defmt::write!(fmt, "Request too large"),
            FetchError::WriteFailed => defmt::write!(fmt, "Write failed"),
            FetchError::ReadFailed => defmt::write!(fmt, "Read failed"),
            FetchError::ResponseTooLarge => defmt::write!(fmt, "Response too large"),
            FetchError::Payload(e) => defmt::write!(fmt, "Invalid payload: {}", e),
        }
    }
}
