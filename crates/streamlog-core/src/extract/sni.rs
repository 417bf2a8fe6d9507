use crate::extract::cursor::Cursor;

const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;
const HANDSHAKE_CLIENT_HELLO: u8 = 0x01;
const EXT_SERVER_NAME: u16 = 0x0000;
const NAME_TYPE_HOST_NAME: u8 = 0x00;

/// Why a payload produced no SNI hostname.
///
/// None of these are failures of the capture; they only explain an absent
/// result when logging at debug level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SniError {
    #[error("truncated ClientHello: a length field runs past the captured bytes")]
    Truncated,
    #[error("not a TLS handshake record")]
    NotHandshake,
    #[error("not a ClientHello message")]
    NotClientHello,
    #[error("no server_name extension")]
    NoServerName,
    #[error("server_name host_name is empty or not UTF-8")]
    InvalidHostname,
}

/// Return the SNI hostname of a ClientHello, or `None` when there is none or
/// the record cannot be walked.
pub fn extract_sni(payload: &[u8]) -> Option<String> {
    parse_sni(payload).ok()
}

/// Walk a TLS record holding a ClientHello down to its server_name extension.
///
/// The input must start at a record boundary. The record and handshake
/// lengths are advisory only: the walk is bounded by the bytes actually
/// present.
///
/// ```text
/// Record:      type(1)=0x16 | version(2) | length(2)
/// Handshake:   type(1)=0x01 | length(3)
/// ClientHello: version(2) | random(32) | session_id<1> |
///              cipher_suites<2> | compression_methods<1> | extensions<2>
/// Extension:   type(2) | data<2>
/// server_name: server_name_list<2> of { name_type(1) | host_name<2> }
/// ```
pub fn parse_sni(payload: &[u8]) -> Result<String, SniError> {
    let mut cur = Cursor::new(payload);

    // Record header
    let content_type = cur.read_u8().ok_or(SniError::Truncated)?;
    if content_type != CONTENT_TYPE_HANDSHAKE {
        return Err(SniError::NotHandshake);
    }
    let _version = cur.read_u16().ok_or(SniError::Truncated)?;
    let _record_len = cur.read_u16().ok_or(SniError::Truncated)?;

    // Handshake header
    let hs_type = cur.read_u8().ok_or(SniError::Truncated)?;
    if hs_type != HANDSHAKE_CLIENT_HELLO {
        return Err(SniError::NotClientHello);
    }
    let _hs_len = cur.read_u24().ok_or(SniError::Truncated)?;

    // client_version + random
    cur.skip(2 + 32).ok_or(SniError::Truncated)?;
    let _session_id = cur.read_vec_u8().ok_or(SniError::Truncated)?;
    let _cipher_suites = cur.read_vec_u16().ok_or(SniError::Truncated)?;
    let _compression = cur.read_vec_u8().ok_or(SniError::Truncated)?;

    // Pre-TLS 1.0 style hellos may end here with no extensions at all.
    if cur.is_empty() {
        return Err(SniError::NoServerName);
    }
    let ext_len = cur.read_u16().ok_or(SniError::Truncated)? as usize;
    // The declared block may run past a short capture; walk what is there.
    let block = cur
        .take(ext_len.min(cur.remaining()))
        .ok_or(SniError::Truncated)?;

    find_server_name(block)
}

fn find_server_name(block: &[u8]) -> Result<String, SniError> {
    let mut exts = Cursor::new(block);
    while exts.remaining() >= 4 {
        let ext_type = exts.read_u16().ok_or(SniError::Truncated)?;
        let data = exts.read_vec_u16().ok_or(SniError::Truncated)?;
        if ext_type == EXT_SERVER_NAME {
            return parse_server_name_list(data);
        }
    }
    Err(SniError::NoServerName)
}

fn parse_server_name_list(data: &[u8]) -> Result<String, SniError> {
    let list = Cursor::new(data)
        .read_vec_u16()
        .ok_or(SniError::Truncated)?;

    let mut entries = Cursor::new(list);
    while !entries.is_empty() {
        let name_type = entries.read_u8().ok_or(SniError::Truncated)?;
        let name = entries.read_vec_u16().ok_or(SniError::Truncated)?;
        if name_type != NAME_TYPE_HOST_NAME {
            continue;
        }
        if name.is_empty() {
            return Err(SniError::InvalidHostname);
        }
        return std::str::from_utf8(name)
            .map(str::to_owned)
            .map_err(|_| SniError::InvalidHostname);
    }
    Err(SniError::NoServerName)
}
