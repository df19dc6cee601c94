//! The executor: one arm per [`Kind`], driven by [`AddrMode`] for operand
//! fetch/store and cycle cost.

use super::constants::*;
use super::Cpu;
use crate::bus::Bus;
use crate::instruction::{AddrMode, Cond, Instruction, Kind, Operand};

impl Cpu {
    pub(super) fn execute(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        use Kind::*;

        match inst.kind {
            Nop => 1,
            Invalid => {
                log::warn!("illegal opcode executed as NOP at PC={:#06X}", self.pc.wrapping_sub(1));
                1
            }
            Ld => self.exec_ld(bus, inst),
            Ldh => self.exec_ldh(bus, inst),
            Push => {
                let v = self.reg16(inst.reg_1);
                self.push16(bus, v);
                4
            }
            Pop => {
                let v = self.pop16(bus);
                self.set_reg16(inst.reg_1, v);
                3
            }
            Add => self.exec_add(bus, inst),
            Adc => self.exec_alu8(bus, inst, |cpu, v| cpu.add_a(v, true)),
            Sub => self.exec_alu8(bus, inst, |cpu, v| cpu.sub_a(v, false)),
            Sbc => self.exec_alu8(bus, inst, |cpu, v| cpu.sub_a(v, true)),
            And => self.exec_alu8(bus, inst, Cpu::and_a),
            Or => self.exec_alu8(bus, inst, Cpu::or_a),
            Xor => self.exec_alu8(bus, inst, Cpu::xor_a),
            Cp => self.exec_alu8(bus, inst, Cpu::cp_a),
            Inc => self.exec_inc_dec(bus, inst, true),
            Dec => self.exec_inc_dec(bus, inst, false),
            Rlca => {
                let a = self.a;
                self.a = self.rlc(a);
                self.set_flag(FLAG_Z, false);
                1
            }
            Rrca => {
                let a = self.a;
                self.a = self.rrc(a);
                self.set_flag(FLAG_Z, false);
                1
            }
            Rla => {
                let a = self.a;
                self.a = self.rl(a);
                self.set_flag(FLAG_Z, false);
                1
            }
            Rra => {
                let a = self.a;
                self.a = self.rr(a);
                self.set_flag(FLAG_Z, false);
                1
            }
            Rlc => self.exec_cb_shift(bus, inst, Cpu::rlc),
            Rrc => self.exec_cb_shift(bus, inst, Cpu::rrc),
            Rl => self.exec_cb_shift(bus, inst, Cpu::rl),
            Rr => self.exec_cb_shift(bus, inst, Cpu::rr),
            Sla => self.exec_cb_shift(bus, inst, Cpu::sla),
            Sra => self.exec_cb_shift(bus, inst, Cpu::sra),
            Swap => self.exec_cb_shift(bus, inst, Cpu::swap),
            Srl => self.exec_cb_shift(bus, inst, Cpu::srl),
            Bit => self.exec_bit(bus, inst),
            Res => self.exec_res_set(bus, inst, false),
            Set => self.exec_res_set(bus, inst, true),
            Jp => self.exec_jp(bus, inst),
            Jr => self.exec_jr(bus, inst),
            Call => self.exec_call(bus, inst),
            Ret => self.exec_ret(bus, inst),
            Reti => {
                self.pc = self.pop16(bus);
                self.ime = true;
                self.ime_pending = false;
                4
            }
            Rst => {
                let pc = self.pc;
                self.push16(bus, pc);
                self.pc = inst.param as u16;
                4
            }
            Daa => {
                self.daa();
                1
            }
            Cpl => {
                self.a = !self.a;
                self.set_flag(FLAG_N, true);
                self.set_flag(FLAG_H, true);
                1
            }
            Scf => {
                self.set_flag(FLAG_N, false);
                self.set_flag(FLAG_H, false);
                self.set_flag(FLAG_C, true);
                1
            }
            Ccf => {
                let c = self.flag(FLAG_C);
                self.set_flag(FLAG_N, false);
                self.set_flag(FLAG_H, false);
                self.set_flag(FLAG_C, !c);
                1
            }
            Di => {
                self.ime = false;
                self.ime_pending = false;
                1
            }
            Ei => {
                self.ime_pending = true;
                1
            }
            Halt => {
                self.halted = true;
                1
            }
            Stop => {
                self.stopped = true;
                1
            }
        }
    }

    fn cond_holds(&self, cond: Cond) -> bool {
        match cond {
            Cond::None => true,
            Cond::Z => self.flag(FLAG_Z),
            Cond::Nz => !self.flag(FLAG_Z),
            Cond::C => self.flag(FLAG_C),
            Cond::Nc => !self.flag(FLAG_C),
        }
    }

    /// True for the 16-bit register operands; everything else is 8-bit.
    fn is_wide(op: Operand) -> bool {
        matches!(op, Operand::BC | Operand::DE | Operand::HL | Operand::SP | Operand::AF)
    }

    fn reg8(&self, op: Operand) -> u8 {
        match op {
            Operand::A => self.a,
            Operand::B => self.b,
            Operand::C => self.c,
            Operand::D => self.d,
            Operand::E => self.e,
            Operand::H => self.h,
            Operand::L => self.l,
            other => unreachable!("not an 8-bit register: {:?}", other),
        }
    }

    fn set_reg8(&mut self, op: Operand, value: u8) {
        match op {
            Operand::A => self.a = value,
            Operand::B => self.b = value,
            Operand::C => self.c = value,
            Operand::D => self.d = value,
            Operand::E => self.e = value,
            Operand::H => self.h = value,
            Operand::L => self.l = value,
            other => unreachable!("not an 8-bit register: {:?}", other),
        }
    }

    fn reg16(&self, op: Operand) -> u16 {
        match op {
            Operand::BC => self.bc(),
            Operand::DE => self.de(),
            Operand::HL => self.hl(),
            Operand::SP => self.sp,
            Operand::AF => self.af(),
            other => unreachable!("not a 16-bit register: {:?}", other),
        }
    }

    fn set_reg16(&mut self, op: Operand, value: u16) {
        match op {
            Operand::BC => self.set_bc(value),
            Operand::DE => self.set_de(value),
            Operand::HL => self.set_hl(value),
            Operand::SP => self.sp = value,
            Operand::AF => self.set_af(value),
            other => unreachable!("not a 16-bit register: {:?}", other),
        }
    }

    /// Resolves an address-bearing operand (BC/DE/HL, or IMM16 via `fetch16`).
    fn addr_of(&mut self, bus: &Bus, op: Operand) -> u16 {
        match op {
            Operand::BC => self.bc(),
            Operand::DE => self.de(),
            Operand::HL => self.hl(),
            Operand::Imm16 => self.fetch16(bus),
            other => unreachable!("not an address operand: {:?}", other),
        }
    }

    fn exec_ld(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        match inst.mode {
            AddrMode::RegReg => {
                let v = if Self::is_wide(inst.reg_2) { self.reg16(inst.reg_2) } else { self.reg8(inst.reg_2) as u16 };
                if Self::is_wide(inst.reg_1) {
                    self.set_reg16(inst.reg_1, v);
                    2
                } else {
                    self.set_reg8(inst.reg_1, v as u8);
                    1
                }
            }
            AddrMode::RegImm8 => {
                let v = self.fetch8(bus);
                self.set_reg8(inst.reg_1, v);
                2
            }
            AddrMode::RegImm16 => {
                let v = self.fetch16(bus);
                self.set_reg16(inst.reg_1, v);
                3
            }
            AddrMode::RegMem => {
                let wide_addr = inst.reg_2 == Operand::Imm16;
                let addr = self.addr_of(bus, inst.reg_2);
                let v = bus.read8(addr);
                self.set_reg8(inst.reg_1, v);
                if wide_addr {
                    4
                } else {
                    2
                }
            }
            AddrMode::MemReg => {
                let wide_addr = inst.reg_1 == Operand::Imm16;
                let imm8_value = inst.reg_2 == Operand::Imm8;
                let addr = self.addr_of(bus, inst.reg_1);
                let v = if imm8_value { self.fetch8(bus) } else { self.reg8(inst.reg_2) };
                bus.write8(addr, v);
                if wide_addr {
                    4
                } else if imm8_value {
                    3
                } else {
                    2
                }
            }
            AddrMode::MemA16Sp => {
                let addr = self.fetch16(bus);
                bus.write16(addr, self.sp);
                5
            }
            AddrMode::RegMemHli => {
                let hl = self.hl();
                self.set_reg8(inst.reg_1, bus.read8(hl));
                self.set_hl(hl.wrapping_add(1));
                2
            }
            AddrMode::MemHliReg => {
                let hl = self.hl();
                bus.write8(hl, self.reg8(inst.reg_2));
                self.set_hl(hl.wrapping_add(1));
                2
            }
            AddrMode::RegMemHld => {
                let hl = self.hl();
                self.set_reg8(inst.reg_1, bus.read8(hl));
                self.set_hl(hl.wrapping_sub(1));
                2
            }
            AddrMode::MemHldReg => {
                let hl = self.hl();
                bus.write8(hl, self.reg8(inst.reg_2));
                self.set_hl(hl.wrapping_sub(1));
                2
            }
            AddrMode::Reg16SpImm8 => {
                let e8 = self.fetch8(bus) as i8;
                let (result, h, c) = self.add_sp_e8(e8);
                self.set_hl(result);
                self.set_flag(FLAG_Z, false);
                self.set_flag(FLAG_N, false);
                self.set_flag(FLAG_H, h);
                self.set_flag(FLAG_C, c);
                3
            }
            other => unreachable!("LD does not support addressing mode {:?}", other),
        }
    }

    fn exec_ldh(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        match inst.mode {
            AddrMode::MemFF00Imm8Reg => {
                let off = self.fetch8(bus);
                bus.write8(0xFF00 + off as u16, self.reg8(inst.reg_2));
                3
            }
            AddrMode::RegMemFF00Imm8 => {
                let off = self.fetch8(bus);
                let v = bus.read8(0xFF00 + off as u16);
                self.set_reg8(inst.reg_1, v);
                3
            }
            AddrMode::MemFF00CReg => {
                bus.write8(0xFF00 + self.c as u16, self.reg8(inst.reg_2));
                2
            }
            AddrMode::RegMemFF00C => {
                let v = bus.read8(0xFF00 + self.c as u16);
                self.set_reg8(inst.reg_1, v);
                2
            }
            other => unreachable!("LDH does not support addressing mode {:?}", other),
        }
    }

    /// Unsigned low-byte-addition flag rule shared by `ADD SP,e8` and `LD HL,SP+e8`.
    fn add_sp_e8(&self, e8: i8) -> (u16, bool, bool) {
        let sp_lo = (self.sp & 0xFF) as u8;
        let e8u = e8 as u8;
        let h = (sp_lo & 0x0F) + (e8u & 0x0F) > 0x0F;
        let c = (sp_lo as u16) + (e8u as u16) > 0xFF;
        let result = self.sp.wrapping_add(e8 as i16 as u16);
        (result, h, c)
    }

    fn exec_add(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        match inst.mode {
            AddrMode::RegReg => {
                let v = self.reg8(inst.reg_2);
                self.add_a(v, false);
                1
            }
            AddrMode::RegMem => {
                let addr = self.hl();
                let v = bus.read8(addr);
                self.add_a(v, false);
                2
            }
            AddrMode::RegImm8 => {
                let v = self.fetch8(bus);
                self.add_a(v, false);
                2
            }
            AddrMode::Reg16 => {
                let v = self.reg16(inst.reg_2);
                self.add_hl(v);
                2
            }
            AddrMode::Reg16Imm8 => {
                let e8 = self.fetch8(bus) as i8;
                let (result, h, c) = self.add_sp_e8(e8);
                self.sp = result;
                self.set_flag(FLAG_Z, false);
                self.set_flag(FLAG_N, false);
                self.set_flag(FLAG_H, h);
                self.set_flag(FLAG_C, c);
                4
            }
            other => unreachable!("ADD does not support addressing mode {:?}", other),
        }
    }

    fn exec_alu8(&mut self, bus: &mut Bus, inst: Instruction, op: fn(&mut Cpu, u8)) -> u8 {
        match inst.mode {
            AddrMode::RegReg => {
                let v = self.reg8(inst.reg_2);
                op(self, v);
                1
            }
            AddrMode::RegMem => {
                let addr = self.hl();
                let v = bus.read8(addr);
                op(self, v);
                2
            }
            AddrMode::RegImm8 => {
                let v = self.fetch8(bus);
                op(self, v);
                2
            }
            other => unreachable!("8-bit ALU does not support addressing mode {:?}", other),
        }
    }

    fn exec_inc_dec(&mut self, bus: &mut Bus, inst: Instruction, is_inc: bool) -> u8 {
        match inst.mode {
            AddrMode::Reg8 => {
                let v = self.reg8(inst.reg_1);
                let r = if is_inc { self.inc_u8(v) } else { self.dec_u8(v) };
                self.set_reg8(inst.reg_1, r);
                1
            }
            AddrMode::MemHl => {
                let addr = self.hl();
                let v = bus.read8(addr);
                let r = if is_inc { self.inc_u8(v) } else { self.dec_u8(v) };
                bus.write8(addr, r);
                3
            }
            AddrMode::Reg16 => {
                let v = self.reg16(inst.reg_1);
                let r = if is_inc { v.wrapping_add(1) } else { v.wrapping_sub(1) };
                self.set_reg16(inst.reg_1, r);
                2
            }
            other => unreachable!("INC/DEC does not support addressing mode {:?}", other),
        }
    }

    fn exec_cb_shift(&mut self, bus: &mut Bus, inst: Instruction, op: fn(&mut Cpu, u8) -> u8) -> u8 {
        match inst.mode {
            AddrMode::CbReg8 => {
                let v = self.reg8(inst.reg_1);
                let r = op(self, v);
                self.set_reg8(inst.reg_1, r);
                2
            }
            AddrMode::CbMemHl => {
                let addr = self.hl();
                let v = bus.read8(addr);
                let r = op(self, v);
                bus.write8(addr, r);
                4
            }
            other => unreachable!("CB shift does not support addressing mode {:?}", other),
        }
    }

    fn exec_bit(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        match inst.mode {
            AddrMode::CbReg8 => {
                let v = self.reg8(inst.reg_1);
                self.op_bit(inst.param, v);
                2
            }
            AddrMode::CbMemHl => {
                let v = bus.read8(self.hl());
                self.op_bit(inst.param, v);
                3
            }
            other => unreachable!("BIT does not support addressing mode {:?}", other),
        }
    }

    fn exec_res_set(&mut self, bus: &mut Bus, inst: Instruction, set: bool) -> u8 {
        match inst.mode {
            AddrMode::CbReg8 => {
                let v = self.reg8(inst.reg_1);
                let r = if set { v | (1 << inst.param) } else { v & !(1 << inst.param) };
                self.set_reg8(inst.reg_1, r);
                2
            }
            AddrMode::CbMemHl => {
                let addr = self.hl();
                let v = bus.read8(addr);
                let r = if set { v | (1 << inst.param) } else { v & !(1 << inst.param) };
                bus.write8(addr, r);
                4
            }
            other => unreachable!("RES/SET does not support addressing mode {:?}", other),
        }
    }

    fn exec_jp(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        match inst.mode {
            AddrMode::Reg16 => {
                self.pc = self.hl();
                1
            }
            AddrMode::Imm16 => {
                let target = self.fetch16(bus);
                if self.cond_holds(inst.cond) {
                    self.pc = target;
                    4
                } else {
                    3
                }
            }
            other => unreachable!("JP does not support addressing mode {:?}", other),
        }
    }

    fn exec_jr(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        let e8 = self.fetch8(bus) as i8;
        if self.cond_holds(inst.cond) {
            self.pc = self.pc.wrapping_add(e8 as i16 as u16);
            3
        } else {
            2
        }
    }

    fn exec_call(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        let target = self.fetch16(bus);
        if self.cond_holds(inst.cond) {
            let pc = self.pc;
            self.push16(bus, pc);
            self.pc = target;
            6
        } else {
            3
        }
    }

    fn exec_ret(&mut self, bus: &mut Bus, inst: Instruction) -> u8 {
        if inst.cond == Cond::None {
            self.pc = self.pop16(bus);
            return 4;
        }
        if self.cond_holds(inst.cond) {
            self.pc = self.pop16(bus);
            5
        } else {
            2
        }
    }

    // --- ALU/flag helpers ---

    fn inc_u8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N, false);
        self.set_flag(FLAG_H, (value & 0x0F) == 0x0F);
        result
    }

    fn dec_u8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N, true);
        self.set_flag(FLAG_H, (value & 0x0F) == 0x00);
        result
    }

    fn add_hl(&mut self, value: u16) {
        let hl = self.hl();
        let (result, carry) = hl.overflowing_add(value);
        let half_carry = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
        self.set_hl(result);
        self.set_flag(FLAG_N, false);
        self.set_flag(FLAG_H, half_carry);
        self.set_flag(FLAG_C, carry);
    }

    fn add_a(&mut self, value: u8, use_carry: bool) {
        let carry_in = if use_carry && self.flag(FLAG_C) { 1 } else { 0 };
        let (res1, c1) = self.a.overflowing_add(value);
        let (result, c2) = res1.overflowing_add(carry_in);
        let half_carry = (self.a & 0x0F) + (value & 0x0F) + carry_in > 0x0F;
        self.a = result;
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N, false);
        self.set_flag(FLAG_H, half_carry);
        self.set_flag(FLAG_C, c1 || c2);
    }

    fn sub_a(&mut self, value: u8, use_carry: bool) {
        let carry_in = if use_carry && self.flag(FLAG_C) { 1 } else { 0 };
        let (res1, b1) = self.a.overflowing_sub(value);
        let (result, b2) = res1.overflowing_sub(carry_in);
        let half_borrow = (self.a & 0x0F) < (value & 0x0F) + carry_in;
        self.a = result;
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N, true);
        self.set_flag(FLAG_H, half_borrow);
        self.set_flag(FLAG_C, b1 || b2);
    }

    fn and_a(&mut self, value: u8) {
        self.a &= value;
        self.set_flag(FLAG_Z, self.a == 0);
        self.set_flag(FLAG_N, false);
        self.set_flag(FLAG_H, true);
        self.set_flag(FLAG_C, false);
    }

    fn xor_a(&mut self, value: u8) {
        self.a ^= value;
        self.set_flag(FLAG_Z, self.a == 0);
        self.set_flag(FLAG_N | FLAG_H | FLAG_C, false);
    }

    fn or_a(&mut self, value: u8) {
        self.a |= value;
        self.set_flag(FLAG_Z, self.a == 0);
        self.set_flag(FLAG_N | FLAG_H | FLAG_C, false);
    }

    fn cp_a(&mut self, value: u8) {
        let a = self.a;
        self.sub_a(value, false);
        self.a = a;
    }

    fn rlc(&mut self, value: u8) -> u8 {
        let carry = value >> 7;
        let result = value.rotate_left(1);
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, carry != 0);
        result
    }

    fn rrc(&mut self, value: u8) -> u8 {
        let carry = value & 1;
        let result = value.rotate_right(1);
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, carry != 0);
        result
    }

    fn rl(&mut self, value: u8) -> u8 {
        let old_carry = self.flag(FLAG_C) as u8;
        let new_carry = value >> 7;
        let result = (value << 1) | old_carry;
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, new_carry != 0);
        result
    }

    fn rr(&mut self, value: u8) -> u8 {
        let old_carry = self.flag(FLAG_C) as u8;
        let new_carry = value & 1;
        let result = (value >> 1) | (old_carry << 7);
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, new_carry != 0);
        result
    }

    fn sla(&mut self, value: u8) -> u8 {
        let carry = value >> 7;
        let result = value << 1;
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, carry != 0);
        result
    }

    fn sra(&mut self, value: u8) -> u8 {
        let carry = value & 1;
        let result = (value >> 1) | (value & 0x80);
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, carry != 0);
        result
    }

    fn swap(&mut self, value: u8) -> u8 {
        let result = value.rotate_left(4);
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H | FLAG_C, false);
        result
    }

    fn srl(&mut self, value: u8) -> u8 {
        let carry = value & 1;
        let result = value >> 1;
        self.set_flag(FLAG_Z, result == 0);
        self.set_flag(FLAG_N | FLAG_H, false);
        self.set_flag(FLAG_C, carry != 0);
        result
    }

    fn op_bit(&mut self, bit: u8, value: u8) {
        self.set_flag(FLAG_Z, (value >> bit) & 1 == 0);
        self.set_flag(FLAG_N, false);
        self.set_flag(FLAG_H, true);
    }

    /// BCD correction after a prior ADD/SUB, chosen by the N flag.
    fn daa(&mut self) {
        let n = self.flag(FLAG_N);
        let h = self.flag(FLAG_H);
        let c = self.flag(FLAG_C);
        let mut adjustment = 0u8;
        let mut carry_out = false;

        if !n {
            if h || (self.a & 0x0F) > 0x09 {
                adjustment |= 0x06;
            }
            if c || self.a > 0x99 {
                adjustment |= 0x60;
                carry_out = true;
            }
            self.a = self.a.wrapping_add(adjustment);
        } else {
            if h {
                adjustment |= 0x06;
            }
            if c {
                adjustment |= 0x60;
                carry_out = true;
            }
            self.a = self.a.wrapping_sub(adjustment);
        }

        self.set_flag(FLAG_Z, self.a == 0);
        self.set_flag(FLAG_H, false);
        self.set_flag(FLAG_C, carry_out);
    }
}
