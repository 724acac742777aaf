//! Parser für die Regionen-Bitmap vom Bild-Server
//!
//! Der Server antwortet auf `GET` mit einer HTTP/1.x Antwort, deren Body
//! ein ASCII-Bitmap ist: ein `'0'` oder `'1'` pro Region, optional gefolgt
//! von Whitespace. Kurze oder kaputte Antworten werden verworfen, der
//! zuletzt gerenderte Frame bleibt dann einfach stehen.

use crate::config::REGION_COUNT;

/// Aktivierungs-Flags, eins pro Region
pub type RegionFlags = [bool; REGION_COUNT];

/// Fehler beim Auswerten der Antwort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// Status-Zeile fehlt oder ist nicht `200`
    Status,
    /// Kein Header-Ende (`\r\n\r\n`) gefunden
    MissingBody,
    /// Weniger als `REGION_COUNT` Zeichen im Body
    TooShort,
    /// Zeichen ist weder `'0'` noch `'1'`
    InvalidByte(u8),
}

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Prüft die Status-Zeile und liefert den Body
pub fn response_body(response: &[u8]) -> Result<&[u8], PayloadError> {
    let status_ok = response
        .split(|&b| b == b' ')
        .nth(1)
        .is_some_and(|code| code == b"200");
    if !response.starts_with(b"HTTP/1.") || !status_ok {
        return Err(PayloadError::Status);
    }

    let header_end = response
        .windows(HEADER_END.len())
        .position(|window| window == HEADER_END)
        .ok_or(PayloadError::MissingBody)?;
    Ok(&response[header_end + HEADER_END.len()..])
}

/// Dekodiert das Bitmap aus einem Body
pub fn parse_flags(body: &[u8]) -> Result<RegionFlags, PayloadError> {
    let body = body.trim_ascii_end();
    if body.len() < REGION_COUNT {
        return Err(PayloadError::TooShort);
    }

    let mut flags = [false; REGION_COUNT];
    for (flag, &byte) in flags.iter_mut().zip(body) {
        *flag = match byte {
            b'1' => true,
            b'0' => false,
            other => return Err(PayloadError::InvalidByte(other)),
        };
    }
    Ok(flags)
}

/// Komplette HTTP-Antwort → Flags
pub fn parse_response(response: &[u8]) -> Result<RegionFlags, PayloadError> {
    response_body(response).and_then(parse_flags)
}

#[cfg(feature = "defmt")]
impl defmt::Format for PayloadError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PayloadError::Status => defmt::write!(fmt, "bad status"),
            PayloadError::MissingBody => defmt::write!(fmt, "missing body"),
            PayloadError::TooShort => defmt::write!(fmt, "payload too short"),
            PayloadError::InvalidByte(b) => defmt::write!(fmt, "invalid byte {=u8:#x}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let flags = parse_flags(b"1000000000000001\n").unwrap();
        assert!(flags[0]);
        assert!(!flags[1]);
        assert!(flags[15]);
    }

    #[test]
    fn test_parse_flags_ignores_extra_bytes() {
        let flags = parse_flags(b"0100000000000000xyz").unwrap();
        assert!(flags[1]);
    }

    #[test]
    fn test_parse_flags_too_short() {
        assert_eq!(parse_flags(b"0101\r\n"), Err(PayloadError::TooShort));
    }

    #[test]
    fn test_parse_flags_invalid_byte() {
        assert_eq!(
            parse_flags(b"01010101010101x1"),
            Err(PayloadError::InvalidByte(b'x'))
        );
    }

    #[test]
    fn test_parse_response() {
        let response = b"HTTP/1.1 200 OK\r\nContent-Length: 16\r\n\r\n1111000011110000";
        let flags = parse_response(response).unwrap();
        assert_eq!(flags.iter().filter(|&&f| f).count(), 8);
    }

    #[test]
    fn test_parse_response_bad_status() {
        let response = b"HTTP/1.1 404 Not Found\r\n\r\n1111000011110000";
        assert_eq!(parse_response(response), Err(PayloadError::Status));
        assert_eq!(parse_response(b"garbage"), Err(PayloadError::Status));
    }

    #[test]
    fn test_parse_response_missing_body() {
        let response = b"HTTP/1.0 200 OK\r\nServer: x\r\n";
        assert_eq!(parse_response(response), Err(PayloadError::MissingBody));
    }
}
