//! Worker-to-consumer bridge for completed generation results.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use strata_field::{ChunkCoord, Heightfield};
use strata_mesh::{BandWeights, MeshData, TessellationError};

/// A tagged result produced by a generation worker.
///
/// Workers never touch chunk state; they build one of these in a fresh
/// allocation and hand ownership across the channel. A worker that cannot
/// produce its result encodes the failure here instead of panicking across
/// the boundary.
pub enum Completion {
    Heightfield {
        coord: ChunkCoord,
        field: Heightfield,
        weights: BandWeights,
    },
    Mesh {
        coord: ChunkCoord,
        lod_index: usize,
        result: Result<MeshData, TessellationError>,
    },
}

/// Moves completed generation work from short-lived worker threads back to
/// the single consumer that owns chunk state.
///
/// One worker thread is spawned per submitted job; its sole side effect is
/// one send on the channel. The consumer drains once per tick.
pub struct CompletionQueue {
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    in_flight: Arc<AtomicU64>,
}

impl CompletionQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            in_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `job` on a fresh worker thread and enqueue its result.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() -> Completion + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        let sender = self.sender.clone();
        std::thread::Builder::new()
            .name("strata-gen-worker".into())
            .spawn(move || {
                // The send fails only if the consumer is gone; the result is
                // simply dropped then.
                let _ = sender.send(job());
            })
            .expect("failed to spawn generation worker thread");
    }

    /// Deliver queued results to `apply`, in enqueue order, on the calling
    /// thread.
    ///
    /// The count is snapshotted at entry so results enqueued by work that
    /// `apply` itself triggers are left for the next tick; one drain never
    /// runs unbounded.
    pub fn drain(&self, mut apply: impl FnMut(Completion)) -> usize {
        let pending = self.receiver.len();
        let mut handled = 0;
        for _ in 0..pending {
            match self.receiver.try_recv() {
                Ok(completion) => {
                    self.in_flight.fetch_sub(1, Ordering::Relaxed);
                    apply(completion);
                    handled += 1;
                }
                Err(_) => break,
            }
        }
        handled
    }

    /// Results already delivered by workers and waiting to be drained.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Jobs submitted but not yet drained (queued, running, or delivered).
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }
}

impl Default for CompletionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn marker(tag: i32) -> Completion {
        Completion::Mesh {
            coord: ChunkCoord::new(tag, 0),
            lod_index: 0,
            result: Ok(MeshData::default()),
        }
    }

    fn wait_for_pending(queue: &CompletionQueue, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while queue.pending() < count {
            assert!(Instant::now() < deadline, "workers never delivered");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_all_submitted_results_delivered() {
        let queue = CompletionQueue::new();
        for tag in 0..8 {
            queue.submit(move || marker(tag));
        }
        wait_for_pending(&queue, 8);

        let mut seen = Vec::new();
        queue.drain(|completion| {
            if let Completion::Mesh { coord, .. } = completion {
                seen.push(coord.x);
            }
        });
        seen.sort_unstable();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
        assert_eq!(queue.in_flight(), 0);
    }

    #[test]
    fn test_drain_is_bounded_by_tick_start_snapshot() {
        let queue = CompletionQueue::new();
        for tag in 0..3 {
            queue.submit(move || marker(tag));
        }
        wait_for_pending(&queue, 3);

        // A callback that schedules more work must not extend this drain.
        let mut handled_inside = 0;
        let handled = queue.drain(|_| {
            handled_inside += 1;
            queue.submit(move || marker(99));
        });
        assert_eq!(handled, 3);
        assert_eq!(handled_inside, 3);

        // The follow-up work is drained on the next tick.
        wait_for_pending(&queue, 3);
        assert_eq!(queue.drain(|_| {}), 3);
    }

    #[test]
    fn test_failure_is_a_value_not_a_panic() {
        let queue = CompletionQueue::new();
        queue.submit(|| Completion::Mesh {
            coord: ChunkCoord::new(0, 0),
            lod_index: 2,
            result: Err(TessellationError::TooCoarse {
                bordered: 6,
                stride: 4,
            }),
        });
        wait_for_pending(&queue, 1);

        let mut failures = 0;
        queue.drain(|completion| {
            if matches!(
                completion,
                Completion::Mesh {
                    result: Err(_),
                    ..
                }
            ) {
                failures += 1;
            }
        });
        assert_eq!(failures, 1);
    }
}
