//! The cartridge collaborator the bus routes ROM-space accesses through.
//!
//! MBC banking is explicitly out of scope for the core: [`Cartridge`] is the
//! narrow interface the bus needs (`cart_read`/`cart_write` over 0x0000-0x7FFF
//! and 0xA000-0xBFFF), and [`NoMbcCartridge`] is the one implementation this
//! crate ships, good for the 32 KiB/no-extra-RAM cartridges Blargg's test ROMs
//! use. A banked MBC1/MBC3/MBC5 cartridge is a separate `Cartridge` impl an
//! embedder can supply; it does not have to live in this crate.

use std::fmt;

/// Routes reads/writes in the cartridge-owned address windows. `cart_write`
/// sees writes in ROM space too, since on real hardware those are bank-select
/// writes rather than ROM stores.
pub trait Cartridge: fmt::Debug {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);
}

/// A fixed 32 KiB ROM with no banking and no external RAM. Reads outside the
/// loaded image return 0xFF; writes are discarded (there is no bank register
/// to hit and no RAM to store into).
#[derive(Clone)]
pub struct NoMbcCartridge {
    rom: Vec<u8>,
}

impl NoMbcCartridge {
    pub fn new(rom: Vec<u8>) -> Self {
        NoMbcCartridge { rom }
    }

    pub fn empty() -> Self {
        NoMbcCartridge { rom: Vec::new() }
    }
}

impl fmt::Debug for NoMbcCartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoMbcCartridge").field("rom_len", &self.rom.len()).finish()
    }
}

impl Cartridge for NoMbcCartridge {
    fn read(&self, addr: u16) -> u8 {
        self.rom.get(addr as usize).copied().unwrap_or(0xFF)
    }

    fn write(&mut self, _addr: u16, _value: u8) {}
}

/// Loads a ROM image from disk. The only error surfaced by the core: an
/// unreadable file, which the host CLI maps to exit code 1.
pub fn load_rom(path: &std::path::Path) -> Result<NoMbcCartridge, String> {
    let data = std::fs::read(path).map_err(|e| format!("failed to read ROM {}: {}", path.display(), e))?;
    Ok(NoMbcCartridge::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_past_the_image_return_0xff() {
        let cart = NoMbcCartridge::new(vec![0x12, 0x34]);
        assert_eq!(cart.read(0), 0x12);
        assert_eq!(cart.read(1), 0x34);
        assert_eq!(cart.read(2), 0xFF);
    }

    #[test]
    fn writes_are_silently_discarded() {
        let mut cart = NoMbcCartridge::new(vec![0x00]);
        cart.write(0, 0xFF);
        assert_eq!(cart.read(0), 0x00);
    }
}
