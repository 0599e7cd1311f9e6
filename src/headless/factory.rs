use std::time::Duration;

use crate::controller::machine::RendererFactory;
use crate::headless::renderer::{HeadlessRenderer, RenderLogHandle};
use crate::stage::renderer::{GpuFeatures, StageRenderer};

/// Builds a [`HeadlessRenderer`] per stage and keeps a handle on each one's log.
#[derive(Debug, Default)]
pub struct HeadlessFactory {
    features: GpuFeatures,
    fill_delay: Option<Duration>,
    logs: Vec<(String, RenderLogHandle)>,
}

impl HeadlessFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_features(mut self, features: GpuFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_fill_delay(mut self, delay: Duration) -> Self {
        self.fill_delay = Some(delay);
        self
    }

    /// Log of the renderer handed to `stage`, if one was built.
    pub fn log(&self, stage: &str) -> Option<RenderLogHandle> {
        self.logs
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, log)| log.clone())
    }
}

impl RendererFactory for HeadlessFactory {
    fn renderer(&mut self, stage: &str) -> Box<dyn StageRenderer> {
        let mut renderer = HeadlessRenderer::new().with_features(self.features);
        if let Some(delay) = self.fill_delay {
            renderer = renderer.with_fill_delay(delay);
        }
        self.logs.push((stage.to_string(), renderer.log()));
        Box::new(renderer)
    }
}
