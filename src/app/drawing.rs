use crate::constants;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;

/// Clears to the DMG background shade and draws a thin bar whose width
/// tracks LY, so the window visibly reflects the PPU stub's scanline
/// position without this crate owning a pixel-accurate frame buffer.
pub fn draw_frame(canvas: &mut Canvas<Window>, ly: u8) {
    canvas.set_draw_color(constants::BACKGROUND_COLOR);
    canvas.clear();

    let progress = (ly as u32 * constants::WINDOW_WIDTH) / 154;
    canvas.set_draw_color(sdl2::pixels::Color::RGB(0x0F, 0x38, 0x0F));
    let _ = canvas.fill_rect(Rect::new(0, 0, progress, 4));

    canvas.present();
}
