//! Application flow: menus, the benchmark run, the interactive demo and score submission.

pub mod machine;
/// Menu scene seam.
pub mod menu;
/// Host platform seam: device info and score transport.
pub mod platform;
pub mod report;
pub mod state;

pub use self::machine::{Controller, RendererFactory};
pub use self::menu::{MenuScene, MenuView, Notice};
pub use self::platform::{
    DeviceInfo, GraphicsInfo, Platform, SubmitOutcome, SubmitReply, SubmitRequest,
};
pub use self::report::{ScoreReport, Scoreboard, SubmitResponse, load_time_score, sign};
pub use self::state::{Button, ControllerState, Widget};
