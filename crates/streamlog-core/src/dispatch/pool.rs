use std::sync::mpsc::{sync_channel, Receiver};
use std::sync::Mutex;
use std::thread;

use tracing::{debug, trace};

use super::{DispatchError, Shutdown};

/// Run `produce` on the calling thread while a fixed set of `workers` threads
/// call `consume` on every frame it hands over.
///
/// Frames travel through a channel holding at most `queue_depth` entries; when
/// it is full, the `deliver` callback given to `produce` blocks. Returns once
/// `produce` has returned and the queue is empty. Frames still queued after
/// `shutdown` is triggered are dropped without calling `consume`.
pub(crate) fn run_pooled<P, C>(
    workers: usize,
    queue_depth: usize,
    shutdown: &Shutdown,
    produce: P,
    consume: &C,
) -> Result<(), DispatchError>
where
    P: FnOnce(&mut dyn FnMut(Vec<u8>) -> bool) -> Result<(), DispatchError>,
    C: Fn(&[u8]) + Sync,
{
    let (tx, rx) = sync_channel::<Vec<u8>>(queue_depth);
    let rx = Mutex::new(rx);
    let rx = &rx;

    thread::scope(|s| {
        // Owned here so an early return closes the channel before the scope
        // joins the workers.
        let tx = tx;

        for id in 0..workers {
            thread::Builder::new()
                .name(format!("streamlog-worker-{}", id))
                .spawn_scoped(s, move || worker_loop(id, rx, shutdown, consume))
                .map_err(DispatchError::Spawn)?;
        }
        debug!("Started {} extraction workers (queue depth {})", workers, queue_depth);

        let mut deliver = |frame: Vec<u8>| tx.send(frame).is_ok();
        produce(&mut deliver)
    })
}

fn worker_loop<C>(id: usize, rx: &Mutex<Receiver<Vec<u8>>>, shutdown: &Shutdown, consume: &C)
where
    C: Fn(&[u8]) + Sync,
{
    let mut dropped = 0usize;
    loop {
        let next = {
            let guard = match rx.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.recv()
        };
        // Keep receiving after shutdown so a producer blocked on a full queue
        // is released.
        match next {
            Ok(_) if shutdown.is_triggered() => dropped += 1,
            Ok(frame) => consume(&frame),
            Err(_) => break,
        }
    }
    if dropped > 0 {
        debug!("Worker {} dropped {} queued frames on shutdown", id, dropped);
    }
    trace!("Worker {} exiting", id);
}
