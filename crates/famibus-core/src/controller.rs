//! Input collaborators for `$4016/$4017`.

use std::fmt::Debug;

/// Device plugged into a controller port.
///
/// Ports without a device read as 0.
pub trait InputSource: Debug {
    /// Next serial bit for a `$4016`/`$4017` read.
    fn read(&mut self) -> u8;

    /// `$4016` write; bit 0 is the strobe line shared by both ports.
    fn write_strobe(&mut self, value: u8);

    /// Host-side button update. Devices without buttons ignore it.
    fn set_button(&mut self, _button: Button, _pressed: bool) {}
}

/// Button ordering follows the pad's shift register (A is shifted out first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];
}

/// Standard 8-button pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controller {
    strobe: bool,
    latched: u8,
    state: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let bit = 1u8 << (button as u8);
        if pressed {
            self.state |= bit;
        } else {
            self.state &= !bit;
        }
        if self.strobe {
            self.latched = self.state;
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.state & (1 << (button as u8)) != 0
    }
}

impl InputSource for Controller {
    fn read(&mut self) -> u8 {
        let bit = self.latched & 0x01;
        if !self.strobe {
            // Official pads return 1 once all eight buttons have been shifted out.
            self.latched = (self.latched >> 1) | 0x80;
        }
        bit | 0x40
    }

    fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 0x01 != 0;
        if self.strobe {
            self.latched = self.state;
        }
    }

    fn set_button(&mut self, button: Button, pressed: bool) {
        Controller::set_button(self, button, pressed);
    }
}
