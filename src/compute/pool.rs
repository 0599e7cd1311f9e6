//! Fixed-size scanline worker pool with a two-phase dispatch/join barrier.
//!
//! Worker `w` of `n` owns rows `{w, w + n, w + 2n, ...}`. Each worker's rows live in their own
//! buffer inside the shared state; at wake-up a worker moves its buffer out under the mutex, fills
//! it without holding the lock, and moves it back before bumping the finished counter. The
//! foreground only reads the buffers once the counter has reached the worker count.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::foundation::core::RasterImage;
use crate::foundation::error::{BenchError, BenchResult};

/// Where a row sits in the frame and which worker is producing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowCtx {
    pub worker: usize,
    pub y: u32,
}

/// Per-row pixel producer run on the worker threads.
pub trait ScanlineKernel: Send + Sync + 'static {
    type Job: Send + Sync + 'static;

    fn render_row(&self, job: &Self::Job, ctx: RowCtx, row: &mut [u32]);
}

/// Bookkeeping latched by the last worker to finish a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    /// Frames fully computed since the pool was spawned.
    pub frame: u64,
    /// Seconds between the dispatch and the last worker finishing.
    pub compute_secs: f32,
}

struct PoolState<J> {
    alive: bool,
    finished: usize,
    signaled: Vec<bool>,
    job: Option<Arc<J>>,
    partitions: Vec<Vec<u32>>,
    dispatched_at: Option<Instant>,
    frames_completed: u64,
    last_compute_secs: f32,
}

struct Shared<K: ScanlineKernel> {
    kernel: K,
    width: u32,
    height: u32,
    workers: usize,
    /// Mirror of `PoolState::alive` that workers poll between rows without taking the lock.
    running: AtomicBool,
    state: Mutex<PoolState<K::Job>>,
    work_ready: Condvar,
    frame_ready: Condvar,
}

impl<K: ScanlineKernel> Shared<K> {
    fn lock(&self) -> MutexGuard<'_, PoolState<K::Job>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct WorkerPool<K: ScanlineKernel> {
    shared: Arc<Shared<K>>,
    handles: Vec<JoinHandle<()>>,
}

/// Number of rows owned by `worker` when `height` rows are striped across `workers`.
pub fn partition_rows(height: u32, workers: usize, worker: usize) -> usize {
    (height as usize).saturating_sub(worker).div_ceil(workers)
}

impl<K: ScanlineKernel> WorkerPool<K> {
    /// Starts `workers` threads for a `width` x `height` frame. Threads park until the first
    /// [`dispatch`](Self::dispatch).
    pub fn spawn(kernel: K, width: u32, height: u32, workers: usize) -> BenchResult<Self> {
        if workers == 0 {
            return Err(BenchError::setup("worker pool needs at least one worker"));
        }
        if width == 0 || height == 0 {
            return Err(BenchError::setup(format!(
                "worker pool frame must be non-empty, got {width}x{height}"
            )));
        }

        let partitions = (0..workers)
            .map(|w| vec![0u32; partition_rows(height, workers, w) * width as usize])
            .collect();
        let shared = Arc::new(Shared {
            kernel,
            width,
            height,
            workers,
            running: AtomicBool::new(true),
            state: Mutex::new(PoolState {
                alive: true,
                finished: workers,
                signaled: vec![false; workers],
                job: None,
                partitions,
                dispatched_at: None,
                frames_completed: 0,
                last_compute_secs: 0.0,
            }),
            work_ready: Condvar::new(),
            frame_ready: Condvar::new(),
        });

        let mut pool = Self {
            shared,
            handles: Vec::with_capacity(workers),
        };
        for id in 0..workers {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("stagemark-worker-{id}"))
                .spawn(move || worker_loop(shared, id))
                .map_err(|e| BenchError::setup(format!("failed to spawn worker {id}: {e}")))?;
            pool.handles.push(handle);
        }
        tracing::debug!(workers, width, height, "worker pool started");
        Ok(pool)
    }

    pub fn workers(&self) -> usize {
        self.shared.workers
    }

    pub fn width(&self) -> u32 {
        self.shared.width
    }

    pub fn height(&self) -> u32 {
        self.shared.height
    }

    pub fn is_alive(&self) -> bool {
        self.shared.lock().alive
    }

    /// Publishes `job` and wakes every worker. Never blocks on the computation.
    ///
    /// The previous frame must have been joined first.
    pub fn dispatch(&self, job: K::Job) -> BenchResult<()> {
        let mut st = self.shared.lock();
        if !st.alive {
            return Err(BenchError::lifecycle("dispatch on a stopped worker pool"));
        }
        if st.finished < self.shared.workers {
            return Err(BenchError::lifecycle(
                "dispatch while the previous frame is still computing",
            ));
        }
        st.job = Some(Arc::new(job));
        st.dispatched_at = Some(Instant::now());
        signal_all(&mut st);
        drop(st);
        self.shared.work_ready.notify_all();
        Ok(())
    }

    pub fn is_frame_ready(&self) -> bool {
        self.shared.lock().finished >= self.shared.workers
    }

    /// Blocks until every worker has finished the dispatched frame.
    ///
    /// Returns `None` once the pool has been stopped; in that case it never blocks.
    pub fn join(&self) -> Option<FrameReport> {
        let mut st = self.shared.lock();
        while st.alive && st.finished < self.shared.workers {
            st = self
                .shared
                .frame_ready
                .wait(st)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if !st.alive {
            return None;
        }
        Some(FrameReport {
            frame: st.frames_completed,
            compute_secs: st.last_compute_secs,
        })
    }

    /// Scatters the completed partitions into `image`.
    pub fn copy_frame_into(&self, image: &mut RasterImage) -> BenchResult<()> {
        let (width, height, workers) = (self.shared.width, self.shared.height, self.shared.workers);
        if image.width != width || image.height != height {
            return Err(BenchError::lifecycle(format!(
                "frame is {width}x{height}, target image is {}x{}",
                image.width, image.height
            )));
        }
        let st = self.shared.lock();
        if st.finished < workers {
            return Err(BenchError::lifecycle("frame read while workers are computing"));
        }
        for (w, rows) in st.partitions.iter().enumerate() {
            for (k, row) in rows.chunks_exact(width as usize).enumerate() {
                let y = (w + k * workers) as u32;
                image.row_mut(y).copy_from_slice(row);
            }
        }
        Ok(())
    }

    /// Clears the liveness flag and wakes every worker without waiting for them to exit.
    pub fn request_shutdown(&self) {
        let mut st = self.shared.lock();
        if !st.alive {
            return;
        }
        st.alive = false;
        self.shared.running.store(false, Ordering::Release);
        signal_all(&mut st);
        drop(st);
        self.shared.work_ready.notify_all();
        self.shared.frame_ready.notify_all();
        tracing::debug!("worker pool shutdown requested");
    }

    /// Stops the pool and joins every thread. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.request_shutdown();
        let mut joined = 0usize;
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("worker thread panicked");
            }
            joined += 1;
        }
        if joined > 0 {
            tracing::debug!(joined, "worker pool stopped");
        }
    }

    pub fn live_threads(&self) -> usize {
        self.handles.len()
    }
}

impl<K: ScanlineKernel> Drop for WorkerPool<K> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn signal_all<J>(st: &mut PoolState<J>) {
    st.finished = 0;
    st.signaled.iter_mut().for_each(|s| *s = true);
}

fn worker_loop<K: ScanlineKernel>(shared: Arc<Shared<K>>, id: usize) {
    let workers = shared.workers;
    let width = shared.width as usize;
    loop {
        let (job, mut rows) = {
            let mut st = shared.lock();
            while !st.signaled[id] {
                st = shared
                    .work_ready
                    .wait(st)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            st.signaled[id] = false;
            if !st.alive {
                break;
            }
            let Some(job) = st.job.clone() else {
                st.finished += 1;
                shared.frame_ready.notify_all();
                continue;
            };
            (job, std::mem::take(&mut st.partitions[id]))
        };

        let mut interrupted = false;
        for (k, row) in rows.chunks_exact_mut(width).enumerate() {
            if !shared.running.load(Ordering::Acquire) {
                interrupted = true;
                break;
            }
            let y = (id + k * workers) as u32;
            shared.kernel.render_row(&job, RowCtx { worker: id, y }, row);
        }

        let mut st = shared.lock();
        st.partitions[id] = rows;
        // A partial frame is never counted; join already reports the pool as stopped.
        if interrupted {
            break;
        }
        st.finished += 1;
        if st.finished == workers {
            st.frames_completed += 1;
            if let Some(t) = st.dispatched_at {
                st.last_compute_secs = t.elapsed().as_secs_f32();
            }
        }
        drop(st);
        shared.frame_ready.notify_all();
    }
    tracing::trace!(worker = id, "worker exiting");
}

#[cfg(test)]
#[path = "../../tests/unit/compute/pool.rs"]
mod tests;
