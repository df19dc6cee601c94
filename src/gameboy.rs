//! The top-level aggregate a host embeds: CPU, bus, and PPU stub wired
//! together behind a single `step`/`request_interrupt` surface.

use crate::bus::{Bus, SerialSink};
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;
use crate::ppu::Ppu;

pub const CPU_CYCLES_PER_FRAME: u32 = 17556;

pub struct GameBoy {
    pub cpu: Cpu,
    pub bus: Bus,
    pub ppu: Ppu,
}

impl GameBoy {
    pub fn new(cartridge: Box<dyn Cartridge>, serial_sink: Box<dyn SerialSink>) -> Self {
        GameBoy { cpu: Cpu::new(), bus: Bus::new(cartridge, serial_sink), ppu: Ppu::new() }
    }

    /// Advances the CPU by one instruction (or one idle cycle while halted)
    /// and steps the PPU stub by the same number of cycles. Returns the
    /// cycle count, matching `step`'s public contract.
    pub fn step(&mut self) -> u8 {
        let cycles = self.cpu.step(&mut self.bus);
        self.ppu.step(cycles, &mut self.bus);
        cycles
    }

    /// Runs roughly one frame's worth of cycles (17556 CPU cycles per frame).
    pub fn run_frame(&mut self) {
        let mut consumed = 0u32;
        while consumed < CPU_CYCLES_PER_FRAME {
            consumed += self.step() as u32;
        }
    }

    pub fn request_interrupt(&mut self, bit: u8) {
        self.bus.request_interrupt(bit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BufferSerialSink;
    use crate::cartridge::NoMbcCartridge;

    #[test]
    fn step_drives_both_cpu_and_ppu() {
        let mut gb = GameBoy::new(Box::new(NoMbcCartridge::empty()), Box::new(BufferSerialSink::default()));
        let cycles = gb.step();
        assert!(cycles > 0);
        assert_eq!(gb.cpu.total_cycles(), cycles as u64);
    }
}
