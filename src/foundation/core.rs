use crate::foundation::error::{BenchError, BenchResult};

/// Drawable surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> BenchResult<Self> {
        if width == 0 || height == 0 {
            return Err(BenchError::config(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn area(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn aspect(self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Opaque ARGB (`0xAARRGGBB`) raster, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn row(&self, y: u32) -> &[u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &mut self.pixels[start..start + w]
    }

    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Straight RGBA8 bytes, suitable for `image::RgbaImage::from_raw`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            out.extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8]);
        }
        out
    }
}

/// Perspective projection parameters for a stage camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub const DEFAULT_FOV_DEG: f32 = 60.0;

    pub fn perspective(viewport: Viewport, near: f32, far: f32) -> Self {
        Self {
            fov_y_deg: Self::DEFAULT_FOV_DEG,
            aspect: viewport.aspect(),
            near,
            far,
        }
    }

    /// Column-major 4x4 perspective matrix.
    pub fn matrix(&self) -> [f32; 16] {
        let f = 1.0 / (self.fov_y_deg.to_radians() * 0.5).tan();
        let nf = 1.0 / (self.near - self.far);
        [
            f / self.aspect,
            0.0,
            0.0,
            0.0,
            0.0,
            f,
            0.0,
            0.0,
            0.0,
            0.0,
            (self.far + self.near) * nf,
            -1.0,
            0.0,
            0.0,
            2.0 * self.far * self.near * nf,
            0.0,
        ]
    }
}
