pub mod classify;
pub mod cursor;
pub mod dns;
pub mod sni;
pub mod types;

#[cfg(test)]
pub(crate) mod testutil;

use tracing::debug;

use crate::extract::classify::classify;
use crate::extract::types::{Event, ProtocolHint};

/// Classify one captured frame and run the matching extractor.
///
/// Never fails: frames that carry nothing of interest, or whose contents do
/// not parse, produce no events.
pub fn extract_frame(frame: &[u8]) -> Vec<Event> {
    let hint = classify(frame);
    let payload = hint.payload(frame);

    match hint {
        ProtocolHint::Dns { .. } => dns::extract_dns(payload)
            .into_iter()
            .map(Event::from)
            .collect(),
        ProtocolHint::TlsHandshake { .. } => match sni::parse_sni(payload) {
            Ok(sni_hostname) => vec![Event::Tls(types::TlsHelloEvent { sni_hostname })],
            Err(e) => {
                debug!("No SNI in handshake ({} bytes): {}", payload.len(), e);
                Vec::new()
            }
        },
        ProtocolHint::Unclassified => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::testutil::*;
    use crate::extract::types::{DnsQueryEvent, DnsRecordType, TlsHelloEvent};

    #[test]
    fn dns_frame_yields_query_events() {
        let frame = udp_frame(40000, 53, &dns_query(&[("example.com", 1), ("example.com", 28)]));
        assert_eq!(
            extract_frame(&frame),
            vec![
                Event::Dns(DnsQueryEvent {
                    name: "example.com".to_string(),
                    record_type: DnsRecordType::A,
                }),
                Event::Dns(DnsQueryEvent {
                    name: "example.com".to_string(),
                    record_type: DnsRecordType::Aaaa,
                }),
            ]
        );
    }

    #[test]
    fn tcp_dns_query_yields_its_question() {
        // query with an EDNS0 OPT record in the additional section
        let mut dns = dns_query(&[("example.com", 1)]);
        dns[10..12].copy_from_slice(&1u16.to_be_bytes());
        dns.extend_from_slice(&[0x00, 0x00, 0x29, 0x10, 0x00, 0, 0, 0, 0, 0x00, 0x00]);
        let frame = tcp_frame(40000, 53, &tcp_dns(&dns));

        assert_eq!(
            extract_frame(&frame),
            vec![Event::Dns(DnsQueryEvent {
                name: "example.com".to_string(),
                record_type: DnsRecordType::A,
            })]
        );
    }

    #[test]
    fn partial_tcp_dns_segment_yields_nothing() {
        let framed = tcp_dns(&dns_query(&[("example.com", 1)]));
        let head = tcp_frame(40000, 53, &framed[..20]);
        let tail = tcp_frame(40000, 53, &framed[20..]);
        assert!(extract_frame(&head).is_empty());
        assert!(extract_frame(&tail).is_empty());
    }

    #[test]
    fn dns_response_frame_yields_nothing() {
        let frame = udp_frame(53, 40000, &dns_response(&[("example.com", 1)]));
        assert!(extract_frame(&frame).is_empty());
    }

    #[test]
    fn tls_frame_yields_hello_event() {
        let frame = tcp_frame(51000, 443, &client_hello_with_sni("example.org"));
        assert_eq!(
            extract_frame(&frame),
            vec![Event::Tls(TlsHelloEvent {
                sni_hostname: "example.org".to_string()
            })]
        );
    }

    #[test]
    fn tls_frame_on_other_port_yields_hello_event() {
        let frame = tcp_frame(51000, 9443, &client_hello_with_sni("example.org"));
        assert_eq!(extract_frame(&frame).len(), 1);
    }

    #[test]
    fn hello_without_sni_yields_nothing() {
        let frame = tcp_frame(51000, 443, &client_hello(Some(&[])));
        assert!(extract_frame(&frame).is_empty());
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(extract_frame(&[]).is_empty());
        assert!(extract_frame(&[0xFF; 13]).is_empty());
        assert!(extract_frame(&[0x00; 1500]).is_empty());
    }

    #[test]
    fn extraction_is_repeatable() {
        let frame = tcp_frame(51000, 443, &client_hello_with_sni("example.org"));
        assert_eq!(extract_frame(&frame), extract_frame(&frame));
    }
}
