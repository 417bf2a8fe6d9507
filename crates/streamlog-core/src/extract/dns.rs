use crate::extract::cursor::Cursor;
use crate::extract::types::{DnsQueryEvent, DnsRecordType};

pub const DNS_HEADER_LEN: usize = 12;

/// QR bit of the header flags: 0 = query, 1 = response.
const FLAG_QR: u16 = 0x8000;

/// RFC 1035 Section 2.3.4
const MAX_LABEL_LEN: usize = 63;

/// Extract one event per question of an outbound DNS query, in message order.
///
/// Responses yield nothing. Truncation or a malformed name stops the walk and
/// returns the questions decoded so far.
///
/// ```text
/// Header (12 bytes)
///  0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// |QR|   Opcode  |AA|TC|RD|RA|   Z    |   RCODE   |
/// |                    QDCOUNT                    |
/// |            ANCOUNT / NSCOUNT / ARCOUNT        |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// Question: QNAME (labels) | QTYPE (2) | QCLASS (2)
/// ```
pub fn extract_dns(payload: &[u8]) -> Vec<DnsQueryEvent> {
    let mut cur = Cursor::new(payload);
    let Some((flags, qd_count)) = read_header(&mut cur) else {
        return Vec::new();
    };
    if flags & FLAG_QR != 0 {
        return Vec::new();
    }

    // QDCOUNT is attacker-controlled; don't size anything from it.
    let mut events = Vec::new();
    for _ in 0..qd_count {
        match read_question(&mut cur) {
            Some(ev) => events.push(ev),
            None => break,
        }
    }
    events
}

fn read_header(cur: &mut Cursor<'_>) -> Option<(u16, u16)> {
    let _id = cur.read_u16()?;
    let flags = cur.read_u16()?;
    let qd_count = cur.read_u16()?;
    // ANCOUNT, NSCOUNT, ARCOUNT
    cur.skip(6)?;
    Some((flags, qd_count))
}

fn read_question(cur: &mut Cursor<'_>) -> Option<DnsQueryEvent> {
    let name = read_name(cur)?;
    let qtype = cur.read_u16()?;
    let _qclass = cur.read_u16()?;
    Some(DnsQueryEvent {
        name,
        record_type: DnsRecordType::from_u16(qtype),
    })
}

/// Decode an uncompressed QNAME into dotted form.
///
/// Compression pointers and over-long labels are rejected rather than
/// followed; questions are never compressed by real resolvers.
fn read_name(cur: &mut Cursor<'_>) -> Option<String> {
    let mut name = String::new();
    loop {
        let len = cur.read_u8()? as usize;
        if len == 0 {
            break;
        }
        if len > MAX_LABEL_LEN {
            return None;
        }
        let label = cur.take(len)?;
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(&String::from_utf8_lossy(label));
    }
    if name.is_empty() {
        name.push('.');
    }
    Some(name)
}
