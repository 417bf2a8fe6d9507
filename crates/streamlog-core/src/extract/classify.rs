use etherparse::{
    EtherType, Ethernet2HeaderSlice, IpNumber, Ipv4HeaderSlice, Ipv6HeaderSlice, TcpHeaderSlice,
    UdpHeaderSlice,
};

use crate::extract::types::ProtocolHint;

pub const DNS_PORT: u16 = 53;

const TCP_DNS_LEN_PREFIX: usize = 2;
const DNS_HEADER_LEN: usize = 12;

/// TLS record content type for Handshake messages.
pub const TLS_CONTENT_HANDSHAKE: u8 = 0x16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

/// Transport-layer facts pulled out of a frame's headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportInfo {
    pub transport: Transport,
    pub src_port: u16,
    pub dst_port: u16,
    /// Offset of the first payload byte within the frame.
    pub payload_offset: usize,
    /// End of the payload within the frame (exclusive).
    pub payload_end: usize,
}

impl TransportInfo {
    pub fn payload_len(&self) -> usize {
        self.payload_end - self.payload_offset
    }

    pub fn payload<'a>(&self, frame: &'a [u8]) -> &'a [u8] {
        frame
            .get(self.payload_offset..self.payload_end)
            .unwrap_or(&[])
    }
}

/// Classify a raw Ethernet frame by what its transport payload appears to
/// carry. Total: any byte sequence yields a hint, and a frame whose headers
/// do not fit is `Unclassified`.
pub fn classify(frame: &[u8]) -> ProtocolHint {
    let Some(info) = parse_transport(frame) else {
        return ProtocolHint::Unclassified;
    };
    let payload = info.payload(frame);

    if is_dns_port(&info) && !payload.is_empty() {
        return match info.transport {
            Transport::Udp => ProtocolHint::Dns {
                payload_offset: info.payload_offset,
                payload_len: info.payload_len(),
            },
            Transport::Tcp => match tcp_dns_message_len(payload) {
                Some(len) => ProtocolHint::Dns {
                    payload_offset: info.payload_offset + TCP_DNS_LEN_PREFIX,
                    payload_len: len,
                },
                None => ProtocolHint::Unclassified,
            },
        };
    }

    // Port 443 is only convention; the record type byte decides.
    if info.transport == Transport::Tcp && looks_like_tls_handshake(payload) {
        return ProtocolHint::TlsHandshake {
            payload_offset: info.payload_offset,
            payload_len: info.payload_len(),
        };
    }

    ProtocolHint::Unclassified
}

/// Walk Ethernet -> IPv4/IPv6 -> TCP/UDP.
///
/// Returns `None` for non-IP frames, other transports, non-first IPv4
/// fragments and any header that runs past the captured bytes.
pub fn parse_transport(frame: &[u8]) -> Option<TransportInfo> {
    let eth = Ethernet2HeaderSlice::from_slice(frame).ok()?;
    let ip_start = eth.slice().len();
    let (protocol, transport_start, declared_end) =
        parse_ip(eth.ether_type(), &frame[ip_start..])?;

    let transport_start = ip_start + transport_start;
    // A zero declared length (TSO captures, jumbograms) carries no information.
    let payload_end = match declared_end {
        Some(end) if end > 0 => frame.len().min(ip_start + end),
        _ => frame.len(),
    };
    let segment = frame.get(transport_start..payload_end)?;

    let (transport, src_port, dst_port, header_len) = if protocol == IpNumber::TCP {
        let tcp = TcpHeaderSlice::from_slice(segment).ok()?;
        (
            Transport::Tcp,
            tcp.source_port(),
            tcp.destination_port(),
            tcp.slice().len(),
        )
    } else if protocol == IpNumber::UDP {
        let udp = UdpHeaderSlice::from_slice(segment).ok()?;
        (
            Transport::Udp,
            udp.source_port(),
            udp.destination_port(),
            udp.slice().len(),
        )
    } else {
        return None;
    };

    Some(TransportInfo {
        transport,
        src_port,
        dst_port,
        payload_offset: transport_start + header_len,
        payload_end,
    })
}

/// Returns (transport protocol, header length, declared end of IP packet)
/// relative to the start of the IP header.
fn parse_ip(ether_type: EtherType, data: &[u8]) -> Option<(IpNumber, usize, Option<usize>)> {
    if ether_type == EtherType::IPV4 {
        let ip = Ipv4HeaderSlice::from_slice(data).ok()?;
        let hdr = ip.slice();
        let frag_offset = u16::from_be_bytes([hdr[6], hdr[7]]) & 0x1FFF;
        if frag_offset != 0 {
            return None;
        }
        Some((ip.protocol(), hdr.len(), Some(usize::from(ip.total_len()))))
    } else if ether_type == EtherType::IPV6 {
        let ip = Ipv6HeaderSlice::from_slice(data).ok()?;
        let hdr_len = ip.slice().len();
        let payload_len = usize::from(ip.payload_length());
        let end = (payload_len > 0).then_some(hdr_len + payload_len);
        Some((ip.next_header(), hdr_len, end))
    } else {
        None
    }
}

/// DNS in either direction: queries go to 53, replies come from it.
pub fn is_dns_port(info: &TransportInfo) -> bool {
    info.src_port == DNS_PORT || info.dst_port == DNS_PORT
}

/// Length of the DNS message framed at the start of a TCP/53 segment
/// (RFC 1035 Section 4.2.2).
///
/// Only a segment that opens with the length prefix and holds the whole
/// first message qualifies. Messages split across segments are not
/// reassembled, and a continuation segment must not be read as a header.
pub fn tcp_dns_message_len(payload: &[u8]) -> Option<usize> {
    let prefix = payload.get(..TCP_DNS_LEN_PREFIX)?;
    let len = usize::from(u16::from_be_bytes([prefix[0], prefix[1]]));
    (len >= DNS_HEADER_LEN && TCP_DNS_LEN_PREFIX + len <= payload.len()).then_some(len)
}

pub fn looks_like_tls_handshake(payload: &[u8]) -> bool {
    payload.first() == Some(&TLS_CONTENT_HANDSHAKE)
}
