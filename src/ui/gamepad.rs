/// Gamepad input tracker using gilrs.
///
/// Fixed mapping:
///   D-pad / Left stick  →  Movement (level-triggered)
///   South / West        →  Action (edge-triggered)
///   Select              →  Quit
///
/// Compiled without the "gamepad" feature, the stub below reports no
/// input and costs nothing.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.3;

/// Per-button state: held (continuous) and just_pressed (edge).
#[cfg(feature = "gamepad")]
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

#[cfg(feature = "gamepad")]
impl BtnState {
    fn press(&mut self) {
        if !self.held {
            self.just_pressed = true;
        }
        self.held = true;
    }

    fn release(&mut self) {
        self.held = false;
    }

    fn tick(&mut self) {
        self.just_pressed = false;
    }
}

#[cfg(feature = "gamepad")]
pub struct Gamepad {
    gilrs: Option<Gilrs>,
    up: BtnState,
    down: BtnState,
    left: BtnState,
    right: BtnState,
    action: BtnState,
    quit: BtnState,
    stick_x: f32,
    stick_y: f32,
}

#[cfg(feature = "gamepad")]
impl Gamepad {
    pub fn new() -> Self {
        Gamepad {
            gilrs: Gilrs::new().ok(),
            up: BtnState::default(),
            down: BtnState::default(),
            left: BtnState::default(),
            right: BtnState::default(),
            action: BtnState::default(),
            quit: BtnState::default(),
            stick_x: 0.0,
            stick_y: 0.0,
        }
    }

    /// Drain pad events. Call once per tick, alongside the keyboard drain.
    pub fn update(&mut self) {
        self.action.tick();
        self.quit.tick();

        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };

        while let Some(ev) = gilrs.next_event() {
            match ev.event {
                EventType::ButtonPressed(button, _) => match button {
                    Button::DPadUp => self.up.press(),
                    Button::DPadDown => self.down.press(),
                    Button::DPadLeft => self.left.press(),
                    Button::DPadRight => self.right.press(),
                    Button::South | Button::West => self.action.press(),
                    Button::Select => self.quit.press(),
                    _ => {}
                },
                EventType::ButtonReleased(button, _) => match button {
                    Button::DPadUp => self.up.release(),
                    Button::DPadDown => self.down.release(),
                    Button::DPadLeft => self.left.release(),
                    Button::DPadRight => self.right.release(),
                    Button::South | Button::West => self.action.release(),
                    Button::Select => self.quit.release(),
                    _ => {}
                },
                EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                    self.stick_x = value;
                }
                EventType::AxisChanged(Axis::LeftStickY, value, _) => {
                    self.stick_y = value;
                }
                _ => {}
            }
        }
    }

    pub fn up_held(&self) -> bool {
        self.up.held || self.stick_y > STICK_DEADZONE
    }

    pub fn down_held(&self) -> bool {
        self.down.held || self.stick_y < -STICK_DEADZONE
    }

    pub fn left_held(&self) -> bool {
        self.left.held || self.stick_x < -STICK_DEADZONE
    }

    pub fn right_held(&self) -> bool {
        self.right.held || self.stick_x > STICK_DEADZONE
    }

    pub fn action_pressed(&self) -> bool {
        self.action.just_pressed
    }

    pub fn quit_pressed(&self) -> bool {
        self.quit.just_pressed
    }
}

// ── Stub when the gamepad feature is off ──

#[cfg(not(feature = "gamepad"))]
pub struct Gamepad;

#[cfg(not(feature = "gamepad"))]
impl Gamepad {
    pub fn new() -> Self {
        Gamepad
    }
    pub fn update(&mut self) {}
    pub fn up_held(&self) -> bool {
        false
    }
    pub fn down_held(&self) -> bool {
        false
    }
    pub fn left_held(&self) -> bool {
        false
    }
    pub fn right_held(&self) -> bool {
        false
    }
    pub fn action_pressed(&self) -> bool {
        false
    }
    pub fn quit_pressed(&self) -> bool {
        false
    }
}
