use boba::bus::StdoutSerialSink;
use boba::cartridge::load_rom;
use boba::GameBoy;
use std::path::Path;

/// Wraps `GameBoy` with the host-side concerns the core doesn't own: ROM
/// loading from disk and a stdout serial sink.
pub struct Emulator {
    pub gb: GameBoy,
}

impl Emulator {
    pub fn new(rom_path: &Path) -> Result<Self, String> {
        let cartridge = load_rom(rom_path)?;
        let gb = GameBoy::new(Box::new(cartridge), Box::new(StdoutSerialSink));
        Ok(Emulator { gb })
    }

    pub fn run_frame(&mut self) {
        self.gb.run_frame();
    }
}
