use crate::compute::pool::{RowCtx, ScanlineKernel};

pub const PALETTE_SIZE: usize = 768;
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;
pub const INSIDE_COLOR: u32 = 0xFF00_0000;
const LOG_ESCAPE: f64 = std::f64::consts::LN_2;

/// Blue, then cyan, then yellow ramps; fully opaque ARGB.
pub fn palette() -> Vec<u32> {
    (0..PALETTE_SIZE as u32)
        .map(|i| {
            let (r, g, b) = if i >= 512 {
                let r = i - 512;
                (r, 255 - r, 0)
            } else if i >= 256 {
                let g = i - 256;
                (0, g, 255 - g)
            } else {
                (0, 0, i)
            };
            0xFF00_0000 | (r << 16) | (g << 8) | b
        })
        .collect()
}

/// The complex-plane window of one frame plus its iteration cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalJob {
    pub min_re: f64,
    pub min_im: f64,
    pub re_step: f64,
    pub im_step: f64,
    pub max_iterations: u32,
}

impl FractalJob {
    /// Window of real width `re_width` centred on `(re, im)`; the imaginary span follows the
    /// image aspect.
    pub fn centered(
        re: f64,
        im: f64,
        re_width: f64,
        width: u32,
        height: u32,
        max_iterations: u32,
    ) -> Self {
        let im_width = re_width * (f64::from(height) / f64::from(width));
        let re_step = re_width / f64::from(width);
        let im_step = im_width / f64::from(height);
        Self {
            min_re: re - re_step * f64::from(width / 2),
            min_im: im - im_step * f64::from(height / 2),
            re_step,
            im_step,
            max_iterations,
        }
    }
}

/// Escape-time Mandelbrot with smoothed palette colouring.
#[derive(Clone, Debug)]
pub struct MandelbrotKernel {
    palette: Vec<u32>,
    /// Iteration count that maps onto the full palette.
    palette_span: f64,
}

impl MandelbrotKernel {
    pub fn new(palette_span: u32) -> Self {
        Self {
            palette: palette(),
            palette_span: f64::from(palette_span.max(1)),
        }
    }

    pub fn color_for(&self, c_re: f64, c_im: f64, max_iterations: u32) -> u32 {
        let (mut z_re, mut z_im) = (c_re, c_im);
        for iter in 0..max_iterations {
            let re2 = z_re * z_re;
            let im2 = z_im * z_im;
            if re2 + im2 > ESCAPE_RADIUS_SQ {
                let modulus = (re2 + im2).sqrt();
                let smooth = f64::from(iter) + 1.0 - modulus.ln().ln() / LOG_ESCAPE;
                let idx = (smooth / self.palette_span * PALETTE_SIZE as f64) as isize;
                return self.palette[idx.clamp(0, PALETTE_SIZE as isize - 1) as usize];
            }
            z_im = 2.0 * z_re * z_im + c_im;
            z_re = re2 - im2 + c_re;
        }
        INSIDE_COLOR
    }
}

impl ScanlineKernel for MandelbrotKernel {
    type Job = FractalJob;

    fn render_row(&self, job: &FractalJob, ctx: RowCtx, row: &mut [u32]) {
        let c_im = job.min_im + f64::from(ctx.y) * job.im_step;
        let mut c_re = job.min_re;
        for px in row.iter_mut() {
            *px = self.color_for(c_re, c_im, job.max_iterations);
            c_re += job.re_step;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compute/mandelbrot.rs"]
mod tests;
