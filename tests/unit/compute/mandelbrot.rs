use super::*;

#[test]
fn palette_ramps_blue_then_green_then_red() {
    let p = palette();
    assert_eq!(p.len(), PALETTE_SIZE);
    assert_eq!(p[0], 0xFF00_0000);
    assert_eq!(p[255], 0xFF00_00FF);
    assert_eq!(p[256], 0xFF00_00FF);
    assert_eq!(p[511], 0xFF00_FF00);
    assert_eq!(p[512], 0xFF00_FF00);
    assert_eq!(p[767], 0xFFFF_0000);
    assert!(p.iter().all(|c| c >> 24 == 0xFF));
}

#[test]
fn origin_is_inside_the_set() {
    let k = MandelbrotKernel::new(50);
    assert_eq!(k.color_for(0.0, 0.0, 100), INSIDE_COLOR);
    assert_eq!(k.color_for(-1.0, 0.0, 100), INSIDE_COLOR);
}

#[test]
fn far_points_escape_immediately() {
    let k = MandelbrotKernel::new(50);
    let c = k.color_for(2.5, 2.5, 100);
    assert_ne!(c, INSIDE_COLOR);
    assert_eq!(c >> 24, 0xFF);
}

#[test]
fn deep_escapes_clamp_into_the_palette() {
    // A point near the boundary that needs many iterations maps past the palette span.
    let k = MandelbrotKernel::new(1);
    let c = k.color_for(0.2501, 0.0, 10_000);
    assert_eq!(c, palette()[PALETTE_SIZE - 1]);
}

#[test]
fn centered_window_spans_requested_width() {
    let job = FractalJob::centered(0.25, 0.5, 0.5, 100, 50, 50);
    assert!((job.re_step - 0.005).abs() < 1e-12);
    assert!((job.im_step - 0.005).abs() < 1e-12);
    assert!((job.min_re - (0.25 - 0.25)).abs() < 1e-12);
    assert!((job.min_im - (0.5 - 0.125)).abs() < 1e-12);
}

#[test]
fn render_row_uses_the_row_imaginary_coordinate() {
    let k = MandelbrotKernel::new(50);
    let job = FractalJob::centered(-0.5, 0.0, 3.0, 8, 8, 64);
    let mut row = vec![0u32; 8];
    k.render_row(&job, RowCtx { worker: 0, y: 4 }, &mut row);
    let c_im = job.min_im + 4.0 * job.im_step;
    let mut c_re = job.min_re;
    for &px in &row {
        assert_eq!(px, k.color_for(c_re, c_im, 64));
        c_re += job.re_step;
    }
}
