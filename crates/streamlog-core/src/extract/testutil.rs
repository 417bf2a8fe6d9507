//! Wire-format builders shared by the extraction and dispatch tests.

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;
pub const PROTO_TCP: u8 = 6;
pub const PROTO_UDP: u8 = 17;

fn ethernet(ether_type: u16) -> Vec<u8> {
    let mut f = vec![
        0x02, 0x00, 0x00, 0x00, 0x00, 0x01, // dst mac
        0x02, 0x00, 0x00, 0x00, 0x00, 0x02, // src mac
    ];
    f.extend_from_slice(&ether_type.to_be_bytes());
    f
}

fn ipv4_header(protocol: u8, payload_len: usize) -> Vec<u8> {
    let total = (20 + payload_len) as u16;
    let mut h = vec![0x45, 0x00];
    h.extend_from_slice(&total.to_be_bytes());
    h.extend_from_slice(&[0x00, 0x00, 0x40, 0x00, 64, protocol, 0x00, 0x00]);
    h.extend_from_slice(&[192, 168, 1, 100]);
    h.extend_from_slice(&[93, 184, 216, 34]);
    h
}

fn ipv6_header(next_header: u8, payload_len: usize) -> Vec<u8> {
    let mut h = vec![0x60, 0x00, 0x00, 0x00];
    h.extend_from_slice(&(payload_len as u16).to_be_bytes());
    h.push(next_header);
    h.push(64);
    let mut src = [0u8; 16];
    src[0] = 0xfe;
    src[1] = 0x80;
    src[15] = 0x01;
    let mut dst = [0u8; 16];
    dst[0] = 0x20;
    dst[1] = 0x01;
    dst[15] = 0x02;
    h.extend_from_slice(&src);
    h.extend_from_slice(&dst);
    h
}

pub fn udp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut s = Vec::with_capacity(8 + payload.len());
    s.extend_from_slice(&src_port.to_be_bytes());
    s.extend_from_slice(&dst_port.to_be_bytes());
    s.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    s.extend_from_slice(&[0x00, 0x00]);
    s.extend_from_slice(payload);
    s
}

pub fn tcp_segment(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut s = Vec::with_capacity(20 + payload.len());
    s.extend_from_slice(&src_port.to_be_bytes());
    s.extend_from_slice(&dst_port.to_be_bytes());
    s.extend_from_slice(&1u32.to_be_bytes()); // seq
    s.extend_from_slice(&0u32.to_be_bytes()); // ack
    s.push(0x50); // data offset: 5 words
    s.push(0x18); // PSH, ACK
    s.extend_from_slice(&0xFFFFu16.to_be_bytes());
    s.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    s.extend_from_slice(payload);
    s
}

/// Ethernet + IPv4 frame around an already-built transport segment.
pub fn ipv4_frame(protocol: u8, segment: &[u8]) -> Vec<u8> {
    let mut f = ethernet(ETHERTYPE_IPV4);
    f.extend_from_slice(&ipv4_header(protocol, segment.len()));
    f.extend_from_slice(segment);
    f
}

/// Ethernet + IPv6 frame around an already-built transport segment.
pub fn ipv6_frame(next_header: u8, segment: &[u8]) -> Vec<u8> {
    let mut f = ethernet(ETHERTYPE_IPV6);
    f.extend_from_slice(&ipv6_header(next_header, segment.len()));
    f.extend_from_slice(segment);
    f
}

pub fn udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    ipv4_frame(PROTO_UDP, &udp_segment(src_port, dst_port, payload))
}

pub fn tcp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    ipv4_frame(PROTO_TCP, &tcp_segment(src_port, dst_port, payload))
}

/// Encode a dotted name as DNS labels, terminated by the root label.
pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

/// A DNS message with the given flags and one question per `(name, qtype)`.
pub fn dns_message(flags: u16, questions: &[(&str, u16)]) -> Vec<u8> {
    let mut m = Vec::new();
    m.extend_from_slice(&0x1234u16.to_be_bytes()); // id
    m.extend_from_slice(&flags.to_be_bytes());
    m.extend_from_slice(&(questions.len() as u16).to_be_bytes());
    m.extend_from_slice(&[0, 0, 0, 0, 0, 0]); // an/ns/ar counts
    for (name, qtype) in questions {
        m.extend_from_slice(&encode_name(name));
        m.extend_from_slice(&qtype.to_be_bytes());
        m.extend_from_slice(&1u16.to_be_bytes()); // IN
    }
    m
}

/// Standard recursive query.
pub fn dns_query(questions: &[(&str, u16)]) -> Vec<u8> {
    dns_message(0x0100, questions)
}

/// DNS-over-TCP framing: a 2-byte message length ahead of the message.
pub fn tcp_dns(message: &[u8]) -> Vec<u8> {
    let mut m = (message.len() as u16).to_be_bytes().to_vec();
    m.extend_from_slice(message);
    m
}

/// Standard response (QR set).
pub fn dns_response(questions: &[(&str, u16)]) -> Vec<u8> {
    dns_message(0x8180, questions)
}

/// A server_name extension (type 0) carrying one host_name entry.
pub fn sni_extension(host: &str) -> Vec<u8> {
    let name = host.as_bytes();
    let mut list = vec![0x00]; // host_name
    list.extend_from_slice(&(name.len() as u16).to_be_bytes());
    list.extend_from_slice(name);

    let mut body = (list.len() as u16).to_be_bytes().to_vec();
    body.extend_from_slice(&list);

    raw_extension(0x0000, &body)
}

pub fn raw_extension(ext_type: u16, body: &[u8]) -> Vec<u8> {
    let mut e = ext_type.to_be_bytes().to_vec();
    e.extend_from_slice(&(body.len() as u16).to_be_bytes());
    e.extend_from_slice(body);
    e
}

/// A TLS record holding a ClientHello whose extensions block is exactly
/// `extensions` (pass `None` to omit the block entirely).
pub fn client_hello(extensions: Option<&[u8]>) -> Vec<u8> {
    let mut body = vec![0x03, 0x03]; // client_version
    body.extend_from_slice(&[0x5A; 32]); // random
    body.push(32); // session id
    body.extend_from_slice(&[0x11; 32]);
    body.extend_from_slice(&[0x00, 0x04, 0x13, 0x01, 0xC0, 0x2F]); // cipher suites
    body.extend_from_slice(&[0x01, 0x00]); // compression: null
    if let Some(ext) = extensions {
        body.extend_from_slice(&(ext.len() as u16).to_be_bytes());
        body.extend_from_slice(ext);
    }

    let mut hs = vec![0x01];
    hs.extend_from_slice(&(body.len() as u32).to_be_bytes()[1..]);
    hs.extend_from_slice(&body);

    let mut rec = vec![0x16, 0x03, 0x01];
    rec.extend_from_slice(&(hs.len() as u16).to_be_bytes());
    rec.extend_from_slice(&hs);
    rec
}

/// A ClientHello with a single SNI extension followed by a trailing
/// supported_versions extension.
pub fn client_hello_with_sni(host: &str) -> Vec<u8> {
    let mut ext = sni_extension(host);
    ext.extend_from_slice(&raw_extension(0x002b, &[0x02, 0x03, 0x04]));
    client_hello(Some(&ext))
}
