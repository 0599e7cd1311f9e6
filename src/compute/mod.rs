pub mod mandelbrot;
pub mod pool;
