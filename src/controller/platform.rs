//! Host services the controller needs but does not implement.

use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};

/// Strings reported by the graphics driver.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicsInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub product_name: String,
    pub os_version: String,
    /// Display-size class, e.g. `mobilephone`, `tablet`, `other`.
    pub device_type: String,
    pub total_ram_kb: u64,
    /// Empty when unknown.
    pub cpu_type: String,
    pub cpu_cores: u32,
    /// Zero when unknown.
    pub cpu_mhz: u32,
    pub graphics: GraphicsInfo,
}

impl DeviceInfo {
    /// Lines of the device-info overlay.
    pub fn overlay_lines(&self) -> Vec<String> {
        let cpu = if self.cpu_type.is_empty() {
            "n/a".to_string()
        } else {
            self.cpu_type.to_lowercase()
        };
        let frequency = if self.cpu_mhz == 0 {
            "n/a".to_string()
        } else {
            format!("{} mhz", self.cpu_mhz)
        };
        let g = &self.graphics;
        vec![
            format!("cpu: {cpu}"),
            format!("num cores: {}", self.cpu_cores),
            format!("frequency: {frequency}"),
            format!("ram: {} kb", self.total_ram_kb),
            format!("gl vendor: {}", g.vendor.to_lowercase()),
            format!("gl renderer: {}", g.renderer.to_lowercase()),
            format!("gl version: {}", g.version.to_lowercase()),
            format!("glsl version: {}", g.shading_language.to_lowercase()),
        ]
    }
}

/// A signed score report ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub url: String,
    pub body: String,
    /// Name of the header carrying `signature`.
    pub signature_header: String,
    pub signature: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub success: bool,
    /// Response body; empty on transport failure.
    pub body: String,
}

/// Completion handle for one submission. Consumed on completion, so it fires at most once;
/// dropping it without completing counts as a failed submission.
#[derive(Debug)]
pub struct SubmitReply(Sender<SubmitOutcome>);

impl SubmitReply {
    pub fn complete(self, success: bool, body: impl Into<String>) {
        let outcome = SubmitOutcome {
            success,
            body: body.into(),
        };
        if self.0.send(outcome).is_err() {
            tracing::debug!("score submission completed after the controller went away");
        }
    }

    pub fn succeed(self, body: impl Into<String>) {
        self.complete(true, body);
    }

    pub fn fail(self) {
        self.complete(false, String::new());
    }
}

pub(crate) fn submit_channel() -> (SubmitReply, Receiver<SubmitOutcome>) {
    let (tx, rx) = mpsc::channel();
    (SubmitReply(tx), rx)
}

pub trait Platform: Send {
    /// Queried once when the controller initializes.
    fn device_info(&self) -> DeviceInfo;

    /// Starts an asynchronous submission. `reply` may be completed from any thread, including
    /// synchronously from inside this call.
    fn submit_score(&mut self, request: SubmitRequest, reply: SubmitReply);

    fn open_url(&mut self, url: &str);

    /// Shows an error message to the user.
    fn show_message(&mut self, message: &str);
}
