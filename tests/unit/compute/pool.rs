use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Stamps every pixel with the worker that produced it and the job's generation.
struct StampKernel {
    rows_seen: Mutex<Vec<RowCtx>>,
}

impl StampKernel {
    fn new() -> Self {
        Self {
            rows_seen: Mutex::new(Vec::new()),
        }
    }
}

impl ScanlineKernel for StampKernel {
    type Job = u32;

    fn render_row(&self, job: &u32, ctx: RowCtx, row: &mut [u32]) {
        self.rows_seen.lock().unwrap().push(ctx);
        for px in row.iter_mut() {
            *px = (*job << 16) | (ctx.worker as u32 + 1);
        }
    }
}

struct SlowKernel {
    calls: Arc<AtomicUsize>,
}

impl ScanlineKernel for SlowKernel {
    type Job = ();

    fn render_row(&self, _job: &(), _ctx: RowCtx, row: &mut [u32]) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(2));
        row.fill(1);
    }
}

#[test]
fn partition_sizes_cover_every_row() {
    assert_eq!(partition_rows(480, 4, 2), 120);
    assert_eq!(partition_rows(10, 4, 0), 3);
    assert_eq!(partition_rows(10, 4, 1), 3);
    assert_eq!(partition_rows(10, 4, 2), 2);
    assert_eq!(partition_rows(10, 4, 3), 2);
    assert_eq!(partition_rows(2, 4, 3), 0);
}

#[test]
fn every_pixel_is_written_by_its_owning_worker() {
    let pool = WorkerPool::spawn(StampKernel::new(), 16, 37, 4).unwrap();
    for generation in 1..=3u32 {
        pool.dispatch(generation).unwrap();
        let report = pool.join().unwrap();
        assert_eq!(report.frame, u64::from(generation));

        let mut img = RasterImage::new(16, 37);
        pool.copy_frame_into(&mut img).unwrap();
        for y in 0..37u32 {
            let expected = (generation << 16) | ((y % 4) + 1);
            assert!(img.row(y).iter().all(|&p| p == expected), "row {y}");
        }
    }
}

#[test]
fn worker_two_of_four_owns_every_fourth_row() {
    let pool = WorkerPool::spawn(StampKernel::new(), 8, 480, 4).unwrap();
    pool.dispatch(1).unwrap();
    pool.join().unwrap();

    let seen = pool.shared.kernel.rows_seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 480);
    let mut rows: Vec<u32> = seen.iter().filter(|c| c.worker == 2).map(|c| c.y).collect();
    rows.sort_unstable();
    let expected: Vec<u32> = (0..120).map(|k| 2 + 4 * k).collect();
    assert_eq!(rows, expected);
    assert_eq!(rows.last(), Some(&478));
}

#[test]
fn more_workers_than_rows_still_completes() {
    let pool = WorkerPool::spawn(StampKernel::new(), 4, 2, 5).unwrap();
    pool.dispatch(7).unwrap();
    assert!(pool.join().is_some());
    let mut img = RasterImage::new(4, 2);
    pool.copy_frame_into(&mut img).unwrap();
    assert_eq!(img.pixel(0, 1), (7 << 16) | 2);
}

#[test]
fn idle_pool_reports_ready_and_join_does_not_block() {
    let pool = WorkerPool::spawn(StampKernel::new(), 4, 4, 2).unwrap();
    assert!(pool.is_frame_ready());
    let report = pool.join().unwrap();
    assert_eq!(report.frame, 0);
}

#[test]
fn dispatch_before_join_is_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = WorkerPool::spawn(
        SlowKernel {
            calls: Arc::clone(&calls),
        },
        4,
        64,
        2,
    )
    .unwrap();
    pool.dispatch(()).unwrap();
    let err = pool.dispatch(()).unwrap_err();
    assert!(err.to_string().contains("lifecycle error:"));
    pool.join().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 64);
}

#[test]
fn shutdown_during_compute_joins_every_thread() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut pool = WorkerPool::spawn(
        SlowKernel {
            calls: Arc::clone(&calls),
        },
        4,
        200,
        4,
    )
    .unwrap();
    pool.dispatch(()).unwrap();
    pool.shutdown();
    assert_eq!(pool.live_threads(), 0);
    assert!(!pool.is_alive());
    assert!(pool.join().is_none());
    assert!(pool.dispatch(()).is_err());

    pool.shutdown();
    assert_eq!(pool.live_threads(), 0);
}

#[test]
fn shutdown_interrupts_a_frame_between_rows() {
    let calls = Arc::new(AtomicUsize::new(0));
    // One worker over 1000 slow rows would need about two seconds for the full frame.
    let mut pool = WorkerPool::spawn(
        SlowKernel {
            calls: Arc::clone(&calls),
        },
        4,
        1000,
        1,
    )
    .unwrap();
    pool.dispatch(()).unwrap();
    std::thread::sleep(Duration::from_millis(20));

    let started = Instant::now();
    pool.shutdown();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(calls.load(Ordering::SeqCst) < 1000);
    assert_eq!(pool.live_threads(), 0);
    assert!(pool.join().is_none());
}

#[test]
fn request_shutdown_does_not_block_and_drop_joins() {
    let pool = WorkerPool::spawn(StampKernel::new(), 4, 8, 3).unwrap();
    pool.request_shutdown();
    assert!(!pool.is_alive());
    assert_eq!(pool.live_threads(), 3);
    drop(pool);
}

#[test]
fn compute_time_is_latched_per_frame() {
    let calls = Arc::new(AtomicUsize::new(0));
    let pool = WorkerPool::spawn(SlowKernel { calls }, 2, 8, 2).unwrap();
    pool.dispatch(()).unwrap();
    let report = pool.join().unwrap();
    assert!(report.compute_secs > 0.0);
    assert_eq!(report.frame, 1);
}

#[test]
fn zero_workers_is_a_setup_error() {
    let err = WorkerPool::spawn(StampKernel::new(), 4, 4, 0).err().unwrap();
    assert!(err.to_string().contains("stage setup error:"));
}

#[test]
fn mismatched_target_image_is_rejected() {
    let pool = WorkerPool::spawn(StampKernel::new(), 4, 4, 2).unwrap();
    let mut img = RasterImage::new(5, 4);
    assert!(pool.copy_frame_into(&mut img).is_err());
}
