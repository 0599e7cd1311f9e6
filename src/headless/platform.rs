use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sysinfo::System;

use crate::controller::platform::{
    DeviceInfo, GraphicsInfo, Platform, SubmitReply, SubmitRequest,
};

/// How a [`HeadlessPlatform`] answers score submissions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    /// No network: every submission fails.
    #[default]
    Offline,
    /// Every submission succeeds with this body.
    Respond(String),
    /// Replies are parked until [`PlatformLogHandle::complete_held`].
    Hold,
}

#[derive(Debug, Default)]
pub struct PlatformLog {
    pub submissions: Vec<SubmitRequest>,
    pub opened_urls: Vec<String>,
    pub messages: Vec<String>,
    held: Vec<SubmitReply>,
}

#[derive(Clone, Debug, Default)]
pub struct PlatformLogHandle(Arc<Mutex<PlatformLog>>);

impl PlatformLogHandle {
    fn lock(&self) -> MutexGuard<'_, PlatformLog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn submissions(&self) -> Vec<SubmitRequest> {
        self.lock().submissions.clone()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.lock().opened_urls.clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().messages.clone()
    }

    /// Completes every parked reply; returns how many there were.
    pub fn complete_held(&self, success: bool, body: &str) -> usize {
        let held = std::mem::take(&mut self.lock().held);
        let n = held.len();
        for reply in held {
            reply.complete(success, body);
        }
        n
    }
}

/// Platform for running without a display or network.
#[derive(Debug)]
pub struct HeadlessPlatform {
    device: DeviceInfo,
    transport: Transport,
    log: PlatformLogHandle,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self {
            device: host_device_info(),
            transport: Transport::Offline,
            log: PlatformLogHandle::default(),
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    pub fn log(&self) -> PlatformLogHandle {
        self.log.clone()
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for HeadlessPlatform {
    fn device_info(&self) -> DeviceInfo {
        self.device.clone()
    }

    fn submit_score(&mut self, request: SubmitRequest, reply: SubmitReply) {
        let mut log = self.log.lock();
        log.submissions.push(request);
        match &self.transport {
            Transport::Offline => reply.fail(),
            Transport::Respond(body) => reply.succeed(body.clone()),
            Transport::Hold => log.held.push(reply),
        }
    }

    fn open_url(&mut self, url: &str) {
        tracing::info!(%url, "open url");
        self.log.lock().opened_urls.push(url.to_string());
    }

    fn show_message(&mut self, message: &str) {
        tracing::warn!(%message, "platform message");
        self.log.lock().messages.push(message.to_string());
    }
}

/// Best-effort description of the machine we run on.
pub fn host_device_info() -> DeviceInfo {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu_all();

    let cpu = sys.cpus().first();
    let cpu_type = cpu
        .map(|c| c.brand().trim())
        .filter(|brand| !brand.is_empty())
        .unwrap_or(std::env::consts::ARCH)
        .to_string();
    let cpu_mhz = cpu.map_or(0, |c| u32::try_from(c.frequency()).unwrap_or(u32::MAX));
    let cpu_cores = std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1);
    DeviceInfo {
        manufacturer: "unknown".to_string(),
        model: "headless".to_string(),
        product_name: System::host_name().unwrap_or_default(),
        os_version: System::long_os_version()
            .unwrap_or_else(|| std::env::consts::OS.to_string()),
        device_type: "other".to_string(),
        total_ram_kb: sys.total_memory() / 1024,
        cpu_type,
        cpu_cores,
        cpu_mhz,
        graphics: GraphicsInfo {
            vendor: "stagemark".to_string(),
            renderer: "headless software".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            shading_language: "none".to_string(),
        },
    }
}
