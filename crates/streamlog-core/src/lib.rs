//! Passive extraction of DNS query names and TLS SNI hostnames from captured
//! link-layer frames.
//!
//! [`extract`] holds the pure, total parsers: every byte sequence yields a
//! (possibly empty) result and nothing ever reads past the buffer.
//! [`dispatch`] drives a frame source through them into an event sink.

pub mod dispatch;
pub mod extract;

pub use dispatch::{
    DispatchConfig, DispatchError, DispatchStats, Dispatcher, EventSink, FrameSource, NextFrame,
    Shutdown,
};
pub use extract::extract_frame;
pub use extract::types::{DnsQueryEvent, DnsRecordType, Event, ProtocolHint, TlsHelloEvent};
