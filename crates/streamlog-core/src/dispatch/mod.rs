mod pool;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::extract::extract_frame;
use crate::extract::types::Event;

/// One poll of a frame source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextFrame {
    /// Raw link-layer bytes, untrusted.
    Frame(Vec<u8>),
    /// Nothing arrived within the source's read timeout.
    Idle,
    /// End of stream (offline file exhausted, device gone quietly).
    Closed,
}

/// Anything that yields captured link-layer frames.
pub trait FrameSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn next_frame(&mut self) -> Result<NextFrame, Self::Error>;
}

/// Receives extracted events. Shared between worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

impl<F> EventSink for F
where
    F: Fn(Event) + Send + Sync,
{
    fn emit(&self, event: Event) {
        self(event)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("frame source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to start extraction worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// External stop request for [`Dispatcher::run`].
///
/// Checked before every fetch from the source; once triggered no further
/// frames are read.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_QUEUE_DEPTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Extraction threads. Zero processes every frame inline on the thread
    /// that reads the source.
    pub workers: usize,
    /// Frames buffered between the reader and the workers.
    pub queue_depth: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

/// Totals for one [`Dispatcher::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub frames: u64,
    pub dns_events: u64,
    pub tls_events: u64,
    /// Frames that produced no event.
    pub discarded: u64,
}

#[derive(Default)]
struct Counters {
    frames: AtomicU64,
    dns_events: AtomicU64,
    tls_events: AtomicU64,
    discarded: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            frames: self.frames.load(Ordering::Relaxed),
            dns_events: self.dns_events.load(Ordering::Relaxed),
            tls_events: self.tls_events.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}

/// Routes frames from a [`FrameSource`] through the extractors into an
/// [`EventSink`].
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// Consume `source` until it closes, fails, or `shutdown` is triggered.
    ///
    /// A malformed frame never stops the loop; only a source error does, and
    /// that error is returned. With workers configured, a frame being extracted
    /// when `shutdown` is triggered finishes, but frames still queued are
    /// dropped unprocessed; the workers are joined before this returns.
    pub fn run<S, K>(
        &self,
        source: &mut S,
        sink: &K,
        shutdown: &Shutdown,
    ) -> Result<DispatchStats, DispatchError>
    where
        S: FrameSource,
        K: EventSink + ?Sized,
    {
        let counters = Counters::default();
        let process = |frame: &[u8]| process_frame(frame, sink, &counters);

        let result = if self.config.workers == 0 {
            pump(source, shutdown, &counters, &mut |frame| {
                process(&frame);
                true
            })
        } else {
            pool::run_pooled(
                self.config.workers,
                self.config.queue_depth.max(1),
                shutdown,
                |deliver| pump(source, shutdown, &counters, deliver),
                &process,
            )
        };

        let stats = counters.snapshot();
        info!(
            "Dispatch finished: {} frames, {} DNS queries, {} TLS hellos, {} discarded",
            stats.frames, stats.dns_events, stats.tls_events, stats.discarded
        );
        result.map(|()| stats)
    }
}

/// Read frames and hand each to `deliver` until the source ends, the stop
/// flag is raised, or `deliver` refuses.
fn pump<S: FrameSource>(
    source: &mut S,
    shutdown: &Shutdown,
    counters: &Counters,
    deliver: &mut dyn FnMut(Vec<u8>) -> bool,
) -> Result<(), DispatchError> {
    while !shutdown.is_triggered() {
        match source.next_frame() {
            Ok(NextFrame::Frame(frame)) => {
                counters.frames.fetch_add(1, Ordering::Relaxed);
                if !deliver(frame) {
                    debug!("Extraction workers gone, stopping capture loop");
                    break;
                }
            }
            Ok(NextFrame::Idle) => continue,
            Ok(NextFrame::Closed) => {
                info!("Frame source closed");
                break;
            }
            Err(e) => return Err(DispatchError::Source(Box::new(e))),
        }
    }
    if shutdown.is_triggered() {
        info!("Shutdown requested, no longer reading frames");
    }
    Ok(())
}

fn process_frame<K: EventSink + ?Sized>(frame: &[u8], sink: &K, counters: &Counters) {
    let events = extract_frame(frame);
    if events.is_empty() {
        counters.discarded.fetch_add(1, Ordering::Relaxed);
        return;
    }
    for event in events {
        match event {
            Event::Dns(_) => counters.dns_events.fetch_add(1, Ordering::Relaxed),
            Event::Tls(_) => counters.tls_events.fetch_add(1, Ordering::Relaxed),
        };
        sink.emit(event);
    }
}
