use std::path::Path;

use anyhow::{Context, Result};
use pcap::{Activated, Active, Capture, Linktype, Offline};
use tracing::{debug, warn};

use streamlog_core::{FrameSource, NextFrame};

/// Live capture read timeout, so the shutdown flag is checked on quiet links.
const READ_TIMEOUT_MS: i32 = 1000;

/// A libpcap handle (live or offline) viewed as a stream of Ethernet frames.
pub struct PcapSource<T: Activated + ?Sized> {
    cap: Capture<T>,
}

impl<T: Activated + ?Sized> FrameSource for PcapSource<T> {
    type Error = pcap::Error;

    fn next_frame(&mut self) -> Result<NextFrame, pcap::Error> {
        match self.cap.next_packet() {
            Ok(packet) => Ok(NextFrame::Frame(packet.data.to_vec())),
            Err(pcap::Error::TimeoutExpired) => Ok(NextFrame::Idle),
            Err(pcap::Error::NoMorePackets) => Ok(NextFrame::Closed),
            Err(e) => Err(e),
        }
    }
}

/// Open a live capture on the given interface with a BPF filter applied.
pub fn open_live(
    iface: &str,
    bpf_filter: &str,
    promisc: bool,
    snaplen: i32,
) -> Result<PcapSource<Active>> {
    let mut cap = Capture::from_device(iface)
        .with_context(|| {
            format!(
                "Failed to open interface '{}'.\n\
                 Hint: run with sudo or: sudo setcap cap_net_raw+ep <binary>",
                iface
            )
        })?
        .promisc(promisc)
        .snaplen(snaplen)
        .timeout(READ_TIMEOUT_MS)
        .open()
        .with_context(|| {
            format!(
                "Failed to activate capture on '{}'. Permission denied?\n\
                 Hint: sudo setcap cap_net_raw+ep <binary>",
                iface
            )
        })?;

    cap.filter(bpf_filter, true)
        .with_context(|| format!("Invalid BPF filter: '{}'", bpf_filter))?;
    debug!("Capture active, BPF filter applied: {}", bpf_filter);

    check_linktype(cap.get_datalink(), iface);
    Ok(PcapSource { cap })
}

/// Replay frames from a pcap savefile.
pub fn open_file(path: &Path, bpf_filter: &str) -> Result<PcapSource<Offline>> {
    let mut cap = Capture::from_file(path)
        .with_context(|| format!("Failed to open capture file '{}'", path.display()))?;

    cap.filter(bpf_filter, true)
        .with_context(|| format!("Invalid BPF filter: '{}'", bpf_filter))?;

    check_linktype(cap.get_datalink(), &path.display().to_string());
    Ok(PcapSource { cap })
}

fn check_linktype(linktype: Linktype, what: &str) {
    if linktype != Linktype::ETHERNET {
        warn!(
            "{} uses link type {:?}, not Ethernet; frames will not be classified",
            what, linktype
        );
    }
}
