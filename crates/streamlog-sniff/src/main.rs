use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use streamlog_core::dispatch::{DEFAULT_QUEUE_DEPTH, DEFAULT_WORKERS};
use streamlog_core::{DispatchConfig, DispatchStats, Dispatcher, FrameSource, Shutdown};

mod capture;
mod interfaces;
mod output;

/// DNS on port 53, plus TCP segments whose payload opens with a TLS handshake
/// record on any port. libpcap only evaluates `tcp[]` on IPv4, so port 443 is
/// kept for IPv6.
const DEFAULT_FILTER: &str = "udp port 53 or tcp port 53 or tcp port 443 \
                              or (tcp[((tcp[12:1] & 0xf0) >> 2):1] = 0x16)";

#[derive(Parser)]
#[command(name = "streamlog-sniff")]
#[command(about = "Passive DNS query and TLS SNI logger: prints hostnames seen on the wire")]
struct Cli {
    /// Network interface to capture on (e.g., eth0, wlan0).
    /// If omitted (and no --read), lists available interfaces and exits.
    #[arg(short, long)]
    interface: Option<String>,

    /// Read frames from a pcap savefile instead of a live interface
    #[arg(short, long, conflicts_with = "interface")]
    read: Option<PathBuf>,

    /// BPF filter expression. Frames it rejects never reach the classifier, so
    /// a narrower filter (e.g. "tcp port 443") also narrows TLS detection.
    #[arg(short, long, default_value = DEFAULT_FILTER)]
    filter: String,

    /// Enable promiscuous mode (capture all traffic on the segment)
    #[arg(short, long, default_value_t = false)]
    promisc: bool,

    /// Snap length (max bytes captured per packet)
    #[arg(short, long, default_value_t = 1600)]
    snaplen: i32,

    /// Output format: "text" (human-readable) or "json" (NDJSON, one object per line)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Extraction worker threads (0 = extract inline on the capture thread)
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Frames buffered between capture and the workers
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH)]
    queue_depth: usize,

    /// Debug logging (per-frame parse outcomes)
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let format = output::OutputFormat::parse(&cli.output)?;
    let sink = output::PrintSink::new(format);
    let dispatcher = Dispatcher::new(DispatchConfig {
        workers: cli.workers,
        queue_depth: cli.queue_depth,
    });

    let shutdown = Shutdown::new();
    let handler_flag = shutdown.clone();
    ctrlc::set_handler(move || handler_flag.trigger())
        .context("Failed to register Ctrl+C handler")?;

    let stats = match (&cli.read, &cli.interface) {
        (Some(path), _) => {
            info!("Reading frames from {}", path.display());
            let mut source = capture::open_file(path, &cli.filter)?;
            run(&dispatcher, &mut source, &sink, &shutdown)?
        }
        (None, Some(iface)) => {
            info!("Capturing on interface: {}", iface);
            info!("BPF filter: {}", cli.filter);
            info!("Press Ctrl+C to stop\n");
            let mut source = capture::open_live(iface, &cli.filter, cli.promisc, cli.snaplen)?;
            run(&dispatcher, &mut source, &sink, &shutdown)?
        }
        (None, None) => {
            let ifaces = interfaces::find_interfaces()
                .context("Failed to list network devices. Do you have permission?")?;
            interfaces::print_interfaces(&ifaces);
            return Ok(());
        }
    };

    info!(
        "{} frames read, {} DNS queries, {} TLS hellos",
        stats.frames, stats.dns_events, stats.tls_events
    );
    Ok(())
}

fn run<S: FrameSource>(
    dispatcher: &Dispatcher,
    source: &mut S,
    sink: &output::PrintSink,
    shutdown: &Shutdown,
) -> Result<DispatchStats> {
    dispatcher
        .run(source, sink, shutdown)
        .context("Capture terminated")
}
