use sdl2::pixels::Color;
use std::time::Duration;

pub const TARGET_FPS: u32 = 60;
pub const TARGET_FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000u64 / TARGET_FPS as u64);

pub const GB_WIDTH: u32 = 160;
pub const GB_HEIGHT: u32 = 144;
pub const SCALE_FACTOR: u32 = 3;
pub const WINDOW_WIDTH: u32 = GB_WIDTH * SCALE_FACTOR;
pub const WINDOW_HEIGHT: u32 = GB_HEIGHT * SCALE_FACTOR;

/// Flat background shown in the window; this crate's PPU stub does not
/// expose a pixel buffer, only LY/STAT state.
pub const BACKGROUND_COLOR: Color = Color::RGB(0x9B, 0xBC, 0x0F);
