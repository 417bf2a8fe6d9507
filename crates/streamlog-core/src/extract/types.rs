use std::fmt;

use serde::{Serialize, Serializer};

/// What a captured frame appears to carry, decided from headers and at most
/// the first payload byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolHint {
    /// UDP or TCP traffic on port 53; the DNS message starts at `payload_offset`.
    Dns {
        payload_offset: usize,
        payload_len: usize,
    },
    /// TCP payload that starts with a TLS Handshake record.
    TlsHandshake {
        payload_offset: usize,
        payload_len: usize,
    },
    Unclassified,
}

impl ProtocolHint {
    /// The transport payload this hint points at, or an empty slice for
    /// `Unclassified` (and for hints that do not fit `frame`).
    pub fn payload<'a>(&self, frame: &'a [u8]) -> &'a [u8] {
        let (offset, len) = match *self {
            ProtocolHint::Dns {
                payload_offset,
                payload_len,
            }
            | ProtocolHint::TlsHandshake {
                payload_offset,
                payload_len,
            } => (payload_offset, payload_len),
            ProtocolHint::Unclassified => return &[],
        };
        offset
            .checked_add(len)
            .and_then(|end| frame.get(offset..end))
            .unwrap_or(&[])
    }
}

/// DNS QTYPE codes (RFC 1035 Section 3.2.2, RFC 3596, RFC 9460)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsRecordType {
    A,
    Ns,
    Cname,
    Soa,
    Ptr,
    Mx,
    Txt,
    Aaaa,
    Srv,
    Https,
    Any,
    Unknown(u16),
}

impl DnsRecordType {
    /// Convert a wire format code into a `DnsRecordType`.
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::A,
            2 => Self::Ns,
            5 => Self::Cname,
            6 => Self::Soa,
            12 => Self::Ptr,
            15 => Self::Mx,
            16 => Self::Txt,
            28 => Self::Aaaa,
            33 => Self::Srv,
            65 => Self::Https,
            255 => Self::Any,
            n => Self::Unknown(n),
        }
    }

    /// The wire format code.
    pub fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Ns => 2,
            Self::Cname => 5,
            Self::Soa => 6,
            Self::Ptr => 12,
            Self::Mx => 15,
            Self::Txt => 16,
            Self::Aaaa => 28,
            Self::Srv => 33,
            Self::Https => 65,
            Self::Any => 255,
            Self::Unknown(n) => n,
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A => "A",
            Self::Ns => "NS",
            Self::Cname => "CNAME",
            Self::Soa => "SOA",
            Self::Ptr => "PTR",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Aaaa => "AAAA",
            Self::Srv => "SRV",
            Self::Https => "HTTPS",
            Self::Any => "ANY",
            Self::Unknown(n) => return f.pad(&format!("TYPE{}", n)),
        };
        f.pad(name)
    }
}

impl Serialize for DnsRecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One question from an outbound DNS query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsQueryEvent {
    /// Dotted name, without a trailing dot (`"."` for the root).
    pub name: String,
    pub record_type: DnsRecordType,
}

/// The SNI host_name from a TLS ClientHello.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsHelloEvent {
    pub sni_hostname: String,
}

/// Anything the engine hands to an event sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Dns(DnsQueryEvent),
    Tls(TlsHelloEvent),
}

impl From<DnsQueryEvent> for Event {
    fn from(ev: DnsQueryEvent) -> Self {
        Event::Dns(ev)
    }
}

impl From<TlsHelloEvent> for Event {
    fn from(ev: TlsHelloEvent) -> Self {
        Event::Tls(ev)
    }
}
