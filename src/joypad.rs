//! P1 (0xFF00) register logic. Key-to-button mapping lives in the host app, not here.

/// True = pressed, false = released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

#[derive(Clone, Debug, Default)]
pub struct JoypadState {
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
}

/// Manages button state and the P1 register's two selectable groups.
#[derive(Clone, Debug)]
pub struct Joypad {
    state: JoypadState,
    /// Bits 4/5 of P1 as last written by the game (the only writable bits).
    selection: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Joypad {
    pub fn new() -> Self {
        Joypad { state: JoypadState::default(), selection: 0x30 }
    }

    /// Reads P1 based on current selection and button state.
    pub fn read_p1(&self) -> u8 {
        let mut low = 0x0F;
        if self.selection & 0x20 == 0 {
            if self.state.a {
                low &= 0b1110;
            }
            if self.state.b {
                low &= 0b1101;
            }
            if self.state.select {
                low &= 0b1011;
            }
            if self.state.start {
                low &= 0b0111;
            }
        }
        if self.selection & 0x10 == 0 {
            if self.state.right {
                low &= 0b1110;
            }
            if self.state.left {
                low &= 0b1101;
            }
            if self.state.up {
                low &= 0b1011;
            }
            if self.state.down {
                low &= 0b0111;
            }
        }
        low | self.selection | 0xC0
    }

    /// Only bits 4/5 are writable.
    pub fn write_p1(&mut self, value: u8) {
        self.selection = value & 0x30;
    }

    /// Returns true if a Joypad interrupt should be requested: the button transitioned
    /// released->pressed and its group (directions/actions) is currently selected.
    pub fn button_down(&mut self, button: Button) -> bool {
        let (newly_pressed, group_selected) = match button {
            Button::Right => (!self.state.right, self.selection & 0x10 == 0),
            Button::Left => (!self.state.left, self.selection & 0x10 == 0),
            Button::Up => (!self.state.up, self.selection & 0x10 == 0),
            Button::Down => (!self.state.down, self.selection & 0x10 == 0),
            Button::A => (!self.state.a, self.selection & 0x20 == 0),
            Button::B => (!self.state.b, self.selection & 0x20 == 0),
            Button::Select => (!self.state.select, self.selection & 0x20 == 0),
            Button::Start => (!self.state.start, self.selection & 0x20 == 0),
        };
        self.set(button, true);
        newly_pressed && group_selected
    }

    pub fn button_up(&mut self, button: Button) {
        self.set(button, false);
    }

    fn set(&mut self, button: Button, pressed: bool) {
        match button {
            Button::Right => self.state.right = pressed,
            Button::Left => self.state.left = pressed,
            Button::Up => self.state.up = pressed,
            Button::Down => self.state.down = pressed,
            Button::A => self.state.a = pressed,
            Button::B => self.state.b = pressed,
            Button::Select => self.state.select = pressed,
            Button::Start => self.state.start = pressed,
        }
    }

    pub fn state(&self) -> &JoypadState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unselected_groups_read_high() {
        let j = Joypad::new();
        assert_eq!(j.read_p1(), 0xFF);
    }

    #[test]
    fn pressing_a_pulls_bit_0_low_when_actions_selected() {
        let mut j = Joypad::new();
        j.write_p1(0x10); // select actions (bit 5 low), directions deselected
        assert!(j.button_down(Button::A));
        assert_eq!(j.read_p1() & 0x0F, 0x0E);
    }

    #[test]
    fn no_interrupt_when_group_not_selected() {
        let mut j = Joypad::new();
        j.write_p1(0x20); // select directions only
        assert!(!j.button_down(Button::A));
    }
}
