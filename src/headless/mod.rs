//! Collaborators for running without a GPU, display or network: the CLI and the tests use them.

pub mod factory;
pub mod menu;
pub mod platform;
pub mod renderer;

pub use self::factory::HeadlessFactory;
pub use self::menu::{HeadlessMenu, MenuLog, MenuLogHandle};
pub use self::platform::{HeadlessPlatform, PlatformLogHandle, Transport, host_device_info};
pub use self::renderer::{HeadlessRenderer, RenderLog, RenderLogHandle};
