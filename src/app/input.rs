use boba::memory_map::JOYPAD_BIT;
use boba::{Button, GameBoy};
use sdl2::EventPump;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

fn map_key(key: Keycode) -> Option<Button> {
    match key {
        Keycode::Right => Some(Button::Right),
        Keycode::Left => Some(Button::Left),
        Keycode::Up => Some(Button::Up),
        Keycode::Down => Some(Button::Down),
        Keycode::Z => Some(Button::A),
        Keycode::X => Some(Button::B),
        Keycode::Return => Some(Button::Start),
        Keycode::RShift | Keycode::LShift => Some(Button::Select),
        _ => None,
    }
}

/// Polls SDL events and updates the joypad. Returns `true` if the host should quit.
pub fn handle_input(event_pump: &mut EventPump, gb: &mut GameBoy) -> bool {
    for event in event_pump.poll_iter() {
        match event {
            Event::Quit { .. } | Event::KeyDown { keycode: Some(Keycode::Escape), .. } => return true,
            Event::KeyDown { keycode: Some(key), repeat: false, .. } => {
                if let Some(button) = map_key(key) {
                    if gb.bus.joypad.button_down(button) {
                        gb.request_interrupt(JOYPAD_BIT);
                    }
                }
            }
            Event::KeyUp { keycode: Some(key), repeat: false, .. } => {
                if let Some(button) = map_key(key) {
                    gb.bus.joypad.button_up(button);
                }
            }
            _ => {}
        }
    }
    false
}
