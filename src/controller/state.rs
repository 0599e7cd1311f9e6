//! Controller states and the widgets each of them shows.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// Idle menu with the start button.
    Ready,
    /// Test selection sliding over the previous menu state.
    StartMenu,
    /// Menu fading out before the stages run.
    Starting,
    Running,
    /// Fading out of an interrupted run, back to `Ready`.
    Aborting,
    /// Menu fading out before the interactive demo.
    StartingDemo,
    RunningDemo,
    /// Menu with the scores of the last run.
    Finished,
}

impl ControllerState {
    /// The two stable states the start menu and the demo return to.
    pub fn is_menu(self) -> bool {
        matches!(self, Self::Ready | Self::Finished)
    }
}

/// Buttons the user can press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Info,
    Start,
    Demo,
    Exit,
    CpuTest,
    FullTest,
    Analyze,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Button(Button),
    /// Translucent panel behind the test selection buttons; touching it closes the start menu.
    Dimmer,
}

/// Inputs to [`visible_widgets`] besides the state itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WidgetContext {
    pub prev_state: Option<ControllerState>,
    /// The last finished run was a full test whose score has not been submitted yet.
    pub analyze_available: bool,
    /// A recent multi-touch made the exit button visible during a run.
    pub exit_armed: bool,
}

fn menu_widgets(state: ControllerState, ctx: WidgetContext, out: &mut Vec<Widget>) {
    out.extend([
        Widget::Button(Button::Start),
        Widget::Button(Button::Demo),
        Widget::Button(Button::Info),
    ]);
    if state == ControllerState::Finished && ctx.analyze_available {
        out.push(Widget::Button(Button::Analyze));
    }
}

pub fn visible_widgets(state: ControllerState, ctx: WidgetContext) -> Vec<Widget> {
    let mut out = Vec::new();
    match state {
        ControllerState::Ready | ControllerState::Finished => menu_widgets(state, ctx, &mut out),
        ControllerState::StartMenu | ControllerState::Starting => {
            out.extend([
                Widget::Dimmer,
                Widget::Button(Button::CpuTest),
                Widget::Button(Button::FullTest),
            ]);
            if let Some(prev) = ctx.prev_state
                && prev.is_menu()
            {
                menu_widgets(prev, ctx, &mut out);
            }
        }
        ControllerState::RunningDemo => out.push(Widget::Button(Button::Exit)),
        ControllerState::Running if ctx.exit_armed => out.push(Widget::Button(Button::Exit)),
        ControllerState::Running | ControllerState::Aborting | ControllerState::StartingDemo => {}
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/controller/state.rs"]
mod tests;
