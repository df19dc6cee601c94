//! The opcode decoder.
//!
//! `decode` is a pure function: given a primary or CB-prefixed opcode byte it
//! returns an [`Instruction`], a small closed description of what the executor
//! needs to run it. Three regular sub-blocks of the primary opcode space (8-bit
//! register loads, 8-bit ALU, and the whole CB plane) are computed directly from
//! the opcode bits instead of being enumerated; everything else comes out of a
//! 256-entry table built once at first use.

use lazy_static::lazy_static;

/// One of the 46-ish distinct instruction kinds the executor knows how to run.
/// Operand width and addressing details live in [`AddrMode`]/[`Operand`], not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Nop,
    Ld,
    Ldh,
    Push,
    Pop,
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Or,
    Xor,
    Cp,
    Inc,
    Dec,
    Rlca,
    Rla,
    Rrca,
    Rra,
    Rlc,
    Rl,
    Rrc,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Bit,
    Res,
    Set,
    Jp,
    Jr,
    Call,
    Ret,
    Reti,
    Rst,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Di,
    Ei,
    Halt,
    Stop,
    /// Illegal opcode (0xD3/0xDB/0xDD/0xE3/0xE4/0xEB/0xEC/0xED/0xF4/0xFC/0xFD).
    /// Decodes and executes as a NOP; see the error-handling notes in the bus/executor.
    Invalid,
}

/// How an instruction's operands are fetched/stored, and therefore how its
/// cycle cost is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// No operands: NOP, RLCA, DAA, CPL, SCF, CCF, DI, EI, HALT, STOP, RET, RETI.
    Implied,
    /// reg_1 <- reg_2, both plain registers (8-bit `LD r,r'`, or `LD SP,HL`).
    RegReg,
    /// reg_1 <- imm8.
    RegImm8,
    /// reg_1 <- imm16.
    RegImm16,
    /// reg_1 <- *(address named by reg_2): reg_2 in {BC,DE,HL,Imm16}.
    RegMem,
    /// *(address named by reg_1) <- reg_2: reg_1 in {BC,DE,HL,Imm16}.
    MemReg,
    /// *(a16) <- SP (the one 16-bit memory store).
    MemA16Sp,
    /// reg_1 <- *(HL); HL <- HL + 1.
    RegMemHli,
    /// *(HL) <- reg_2; HL <- HL + 1.
    MemHliReg,
    /// reg_1 <- *(HL); HL <- HL - 1.
    RegMemHld,
    /// *(HL) <- reg_2; HL <- HL - 1.
    MemHldReg,
    /// *(0xFF00 + imm8) <- reg_2 (LDH (a8),A).
    MemFF00Imm8Reg,
    /// reg_1 <- *(0xFF00 + imm8) (LDH A,(a8)).
    RegMemFF00Imm8,
    /// *(0xFF00 + C) <- reg_2.
    MemFF00CReg,
    /// reg_1 <- *(0xFF00 + C).
    RegMemFF00C,
    /// HL <- SP + e8 (signed immediate); flags per the unsigned low-byte rule.
    Reg16SpImm8,
    /// SP <- SP + e8; used only by ADD SP,e8.
    Reg16Imm8,
    /// Single 8-bit register operand (INC/DEC r8, non-CB rotates on a register).
    Reg8,
    /// Single (HL) memory operand (INC/DEC (HL)).
    MemHl,
    /// Single 16-bit register operand (INC/DEC rr, PUSH/POP rr, JP (HL)).
    Reg16,
    /// Unconditional/conditional relative jump; reg_2 = Imm8 (signed offset).
    JrImm8,
    /// Unconditional/conditional absolute jump/call; reg_2 = Imm16.
    Imm16,
    /// RST n; target is `param`.
    RstVec,
    /// CB-prefixed op whose operand is a plain register.
    CbReg8,
    /// CB-prefixed op whose operand is (HL).
    CbMemHl,
}

/// A register, register pair, or immediate-operand placeholder. The decoder
/// never carries an actual value for IMM8/IMM16 — the executor re-reads PC
/// itself via `fetch8`/`fetch16`, matching the hardware's own fetch timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    BC,
    DE,
    HL,
    SP,
    AF,
    Imm8,
    Imm16,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    None,
    Z,
    Nz,
    C,
    Nc,
}

/// The decoder's sole output. Pure data; the executor interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub kind: Kind,
    pub mode: AddrMode,
    pub reg_1: Operand,
    pub reg_2: Operand,
    pub cond: Cond,
    /// CB bit index (0..7) for BIT/RES/SET, or the absolute RST vector.
    pub param: u8,
}

impl Instruction {
    const fn new(kind: Kind, mode: AddrMode, reg_1: Operand, reg_2: Operand, cond: Cond, param: u8) -> Self {
        Instruction { kind, mode, reg_1, reg_2, cond, param }
    }

    const fn implied(kind: Kind) -> Self {
        Self::new(kind, AddrMode::Implied, Operand::None, Operand::None, Cond::None, 0)
    }
}

/// `r8[n]` from the classic "r8 = [B,C,D,E,H,L,(HL),A]" opcode decomposition.
const fn r8(index: u8) -> Operand {
    match index & 7 {
        0 => Operand::B,
        1 => Operand::C,
        2 => Operand::D,
        3 => Operand::E,
        4 => Operand::H,
        5 => Operand::L,
        6 => Operand::HL, // placeholder: caller must special-case (HL)
        _ => Operand::A,
    }
}

const ALU_KINDS: [Kind; 8] =
    [Kind::Add, Kind::Adc, Kind::Sub, Kind::Sbc, Kind::And, Kind::Xor, Kind::Or, Kind::Cp];

const CB_ROT_KINDS: [Kind; 8] =
    [Kind::Rlc, Kind::Rrc, Kind::Rl, Kind::Rr, Kind::Sla, Kind::Sra, Kind::Swap, Kind::Srl];

/// Decodes one opcode. `cb_prefixed` selects the second 256-entry plane.
pub fn decode(opcode: u8, cb_prefixed: bool) -> Instruction {
    if cb_prefixed {
        return decode_cb(opcode);
    }

    // Primary 0x40-0x7F: 8-bit register loads, except 0x76 = HALT.
    if (0x40..=0x7F).contains(&opcode) {
        if opcode == 0x76 {
            return Instruction::implied(Kind::Halt);
        }
        let src = r8(opcode);
        let dst = r8(opcode >> 3);
        return match (dst, src) {
            (Operand::HL, _) => Instruction::new(Kind::Ld, AddrMode::MemReg, Operand::HL, r8_real(opcode), Cond::None, 0),
            (_, Operand::HL) => Instruction::new(Kind::Ld, AddrMode::RegMem, dst, Operand::HL, Cond::None, 0),
            _ => Instruction::new(Kind::Ld, AddrMode::RegReg, dst, src, Cond::None, 0),
        };
    }

    // Primary 0x80-0xBF: 8-bit ALU on A, source r8[op & 7].
    if (0x80..=0xBF).contains(&opcode) {
        let kind = ALU_KINDS[((opcode >> 3) & 7) as usize];
        let src = r8(opcode);
        return match src {
            Operand::HL => Instruction::new(kind, AddrMode::RegMem, Operand::A, Operand::HL, Cond::None, 0),
            _ => Instruction::new(kind, AddrMode::RegReg, Operand::A, r8_real(opcode), Cond::None, 0),
        };
    }

    PRIMARY_TABLE[opcode as usize]
}

/// Like `r8` but the caller has already special-cased the `(HL)` slot, so this
/// is only used where the operand is guaranteed to be a plain register.
const fn r8_real(opcode: u8) -> Operand {
    r8(opcode)
}

fn decode_cb(opcode: u8) -> Instruction {
    let quadrant = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;
    let target = r8(z);
    let is_mem = z == 6;

    match quadrant {
        0 => {
            let kind = CB_ROT_KINDS[y as usize];
            if is_mem {
                Instruction::new(kind, AddrMode::CbMemHl, Operand::HL, Operand::None, Cond::None, 0)
            } else {
                Instruction::new(kind, AddrMode::CbReg8, target, Operand::None, Cond::None, 0)
            }
        }
        1 => {
            if is_mem {
                Instruction::new(Kind::Bit, AddrMode::CbMemHl, Operand::HL, Operand::None, Cond::None, y)
            } else {
                Instruction::new(Kind::Bit, AddrMode::CbReg8, target, Operand::None, Cond::None, y)
            }
        }
        2 => {
            if is_mem {
                Instruction::new(Kind::Res, AddrMode::CbMemHl, Operand::HL, Operand::None, Cond::None, y)
            } else {
                Instruction::new(Kind::Res, AddrMode::CbReg8, target, Operand::None, Cond::None, y)
            }
        }
        _ => {
            if is_mem {
                Instruction::new(Kind::Set, AddrMode::CbMemHl, Operand::HL, Operand::None, Cond::None, y)
            } else {
                Instruction::new(Kind::Set, AddrMode::CbReg8, target, Operand::None, Cond::None, y)
            }
        }
    }
}

macro_rules! i {
    ($kind:expr, $mode:expr, $r1:expr, $r2:expr, $cond:expr, $param:expr) => {
        Instruction::new($kind, $mode, $r1, $r2, $cond, $param)
    };
}

lazy_static! {
    /// Everything outside the three regular sub-blocks: 0x00-0x3F and 0xC0-0xFF.
    /// Slots inside 0x40-0xBF are unused filler (computed directly by `decode`).
    static ref PRIMARY_TABLE: [Instruction; 256] = {
        use AddrMode::*;
        use Cond::*;
        use Kind::*;
        use Operand::*;

        let mut t = [Instruction::implied(Nop); 256];

        t[0x00] = Instruction::implied(Nop);
        t[0x01] = i!(Ld, RegImm16, BC, Imm16, None, 0);
        t[0x02] = i!(Ld, MemReg, BC, A, None, 0);
        t[0x03] = i!(Inc, Reg16, BC, None, None, 0);
        t[0x04] = i!(Inc, Reg8, B, None, None, 0);
        t[0x05] = i!(Dec, Reg8, B, None, None, 0);
        t[0x06] = i!(Ld, RegImm8, B, Imm8, None, 0);
        t[0x07] = Instruction::implied(Rlca);
        t[0x08] = i!(Ld, MemA16Sp, None, SP, None, 0);
        t[0x09] = i!(Add, Reg16, HL, BC, None, 0);
        t[0x0A] = i!(Ld, RegMem, A, BC, None, 0);
        t[0x0B] = i!(Dec, Reg16, BC, None, None, 0);
        t[0x0C] = i!(Inc, Reg8, C, None, None, 0);
        t[0x0D] = i!(Dec, Reg8, C, None, None, 0);
        t[0x0E] = i!(Ld, RegImm8, C, Imm8, None, 0);
        t[0x0F] = Instruction::implied(Rrca);

        t[0x10] = Instruction::implied(Stop);
        t[0x11] = i!(Ld, RegImm16, DE, Imm16, None, 0);
        t[0x12] = i!(Ld, MemReg, DE, A, None, 0);
        t[0x13] = i!(Inc, Reg16, DE, None, None, 0);
        t[0x14] = i!(Inc, Reg8, D, None, None, 0);
        t[0x15] = i!(Dec, Reg8, D, None, None, 0);
        t[0x16] = i!(Ld, RegImm8, D, Imm8, None, 0);
        t[0x17] = Instruction::implied(Rla);
        t[0x18] = i!(Jr, JrImm8, None, Imm8, None, 0);
        t[0x19] = i!(Add, Reg16, HL, DE, None, 0);
        t[0x1A] = i!(Ld, RegMem, A, DE, None, 0);
        t[0x1B] = i!(Dec, Reg16, DE, None, None, 0);
        t[0x1C] = i!(Inc, Reg8, E, None, None, 0);
        t[0x1D] = i!(Dec, Reg8, E, None, None, 0);
        t[0x1E] = i!(Ld, RegImm8, E, Imm8, None, 0);
        t[0x1F] = Instruction::implied(Rra);

        t[0x20] = i!(Jr, JrImm8, None, Imm8, Nz, 0);
        t[0x21] = i!(Ld, RegImm16, HL, Imm16, None, 0);
        t[0x22] = i!(Ld, MemHliReg, HL, A, None, 0);
        t[0x23] = i!(Inc, Reg16, HL, None, None, 0);
        t[0x24] = i!(Inc, Reg8, H, None, None, 0);
        t[0x25] = i!(Dec, Reg8, H, None, None, 0);
        t[0x26] = i!(Ld, RegImm8, H, Imm8, None, 0);
        t[0x27] = Instruction::implied(Daa);
        t[0x28] = i!(Jr, JrImm8, None, Imm8, Z, 0);
        t[0x29] = i!(Add, Reg16, HL, HL, None, 0);
        t[0x2A] = i!(Ld, RegMemHli, A, HL, None, 0);
        t[0x2B] = i!(Dec, Reg16, HL, None, None, 0);
        t[0x2C] = i!(Inc, Reg8, L, None, None, 0);
        t[0x2D] = i!(Dec, Reg8, L, None, None, 0);
        t[0x2E] = i!(Ld, RegImm8, L, Imm8, None, 0);
        t[0x2F] = Instruction::implied(Cpl);

        t[0x30] = i!(Jr, JrImm8, None, Imm8, Nc, 0);
        t[0x31] = i!(Ld, RegImm16, SP, Imm16, None, 0);
        t[0x32] = i!(Ld, MemHldReg, HL, A, None, 0);
        t[0x33] = i!(Inc, Reg16, SP, None, None, 0);
        t[0x34] = i!(Inc, MemHl, HL, None, None, 0);
        t[0x35] = i!(Dec, MemHl, HL, None, None, 0);
        t[0x36] = i!(Ld, MemReg, HL, Imm8, None, 0);
        t[0x37] = Instruction::implied(Scf);
        t[0x38] = i!(Jr, JrImm8, None, Imm8, C, 0);
        t[0x39] = i!(Add, Reg16, HL, SP, None, 0);
        t[0x3A] = i!(Ld, RegMemHld, A, HL, None, 0);
        t[0x3B] = i!(Dec, Reg16, SP, None, None, 0);
        t[0x3C] = i!(Inc, Reg8, A, None, None, 0);
        t[0x3D] = i!(Dec, Reg8, A, None, None, 0);
        t[0x3E] = i!(Ld, RegImm8, A, Imm8, None, 0);
        t[0x3F] = Instruction::implied(Ccf);

        // 0x40-0xBF computed directly by `decode`; left as NOP filler here.

        t[0xC0] = i!(Ret, Implied, None, None, Nz, 0);
        t[0xC1] = i!(Pop, Reg16, BC, None, None, 0);
        t[0xC2] = i!(Jp, Imm16, None, Imm16, Nz, 0);
        t[0xC3] = i!(Jp, Imm16, None, Imm16, None, 0);
        t[0xC4] = i!(Call, Imm16, None, Imm16, Nz, 0);
        t[0xC5] = i!(Push, Reg16, BC, None, None, 0);
        t[0xC6] = i!(Add, RegImm8, A, Imm8, None, 0);
        t[0xC7] = i!(Rst, RstVec, None, None, None, 0x00);
        t[0xC8] = i!(Ret, Implied, None, None, Z, 0);
        t[0xC9] = Instruction::implied(Ret);
        t[0xCA] = i!(Jp, Imm16, None, Imm16, Z, 0);
        t[0xCB] = Instruction::implied(Nop); // prefix byte, never directly decoded/executed
        t[0xCC] = i!(Call, Imm16, None, Imm16, Z, 0);
        t[0xCD] = i!(Call, Imm16, None, Imm16, None, 0);
        t[0xCE] = i!(Adc, RegImm8, A, Imm8, None, 0);
        t[0xCF] = i!(Rst, RstVec, None, None, None, 0x08);

        t[0xD0] = i!(Ret, Implied, None, None, Nc, 0);
        t[0xD1] = i!(Pop, Reg16, DE, None, None, 0);
        t[0xD2] = i!(Jp, Imm16, None, Imm16, Nc, 0);
        t[0xD3] = Instruction::implied(Invalid);
        t[0xD4] = i!(Call, Imm16, None, Imm16, Nc, 0);
        t[0xD5] = i!(Push, Reg16, DE, None, None, 0);
        t[0xD6] = i!(Sub, RegImm8, A, Imm8, None, 0);
        t[0xD7] = i!(Rst, RstVec, None, None, None, 0x10);
        t[0xD8] = i!(Ret, Implied, None, None, C, 0);
        t[0xD9] = Instruction::implied(Reti);
        t[0xDA] = i!(Jp, Imm16, None, Imm16, C, 0);
        t[0xDB] = Instruction::implied(Invalid);
        t[0xDC] = i!(Call, Imm16, None, Imm16, C, 0);
        t[0xDD] = Instruction::implied(Invalid);
        t[0xDE] = i!(Sbc, RegImm8, A, Imm8, None, 0);
        t[0xDF] = i!(Rst, RstVec, None, None, None, 0x18);

        t[0xE0] = i!(Ldh, MemFF00Imm8Reg, None, A, None, 0);
        t[0xE1] = i!(Pop, Reg16, HL, None, None, 0);
        t[0xE2] = i!(Ldh, MemFF00CReg, None, A, None, 0);
        t[0xE3] = Instruction::implied(Invalid);
        t[0xE4] = Instruction::implied(Invalid);
        t[0xE5] = i!(Push, Reg16, HL, None, None, 0);
        t[0xE6] = i!(And, RegImm8, A, Imm8, None, 0);
        t[0xE7] = i!(Rst, RstVec, None, None, None, 0x20);
        t[0xE8] = i!(Add, Reg16Imm8, SP, Imm8, None, 0);
        t[0xE9] = i!(Jp, Reg16, HL, None, None, 0);
        t[0xEA] = i!(Ld, MemReg, Imm16, A, None, 0);
        t[0xEB] = Instruction::implied(Invalid);
        t[0xEC] = Instruction::implied(Invalid);
        t[0xED] = Instruction::implied(Invalid);
        t[0xEE] = i!(Xor, RegImm8, A, Imm8, None, 0);
        t[0xEF] = i!(Rst, RstVec, None, None, None, 0x28);

        t[0xF0] = i!(Ldh, RegMemFF00Imm8, A, None, None, 0);
        t[0xF1] = i!(Pop, Reg16, AF, None, None, 0);
        t[0xF2] = i!(Ldh, RegMemFF00C, A, None, None, 0);
        t[0xF3] = Instruction::implied(Di);
        t[0xF4] = Instruction::implied(Invalid);
        t[0xF5] = i!(Push, Reg16, AF, None, None, 0);
        t[0xF6] = i!(Or, RegImm8, A, Imm8, None, 0);
        t[0xF7] = i!(Rst, RstVec, None, None, None, 0x30);
        t[0xF8] = i!(Ld, Reg16SpImm8, HL, Imm8, None, 0);
        t[0xF9] = i!(Ld, RegReg, SP, HL, None, 0);
        t[0xFA] = i!(Ld, RegMem, A, Imm16, None, 0);
        t[0xFB] = Instruction::implied(Ei);
        t[0xFC] = Instruction::implied(Invalid);
        t[0xFD] = Instruction::implied(Invalid);
        t[0xFE] = i!(Cp, RegImm8, A, Imm8, None, 0);
        t[0xFF] = i!(Rst, RstVec, None, None, None, 0x38);

        t
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_total() {
        for op in 0u8..=255 {
            let _ = decode(op, false);
            let _ = decode(op, true);
        }
    }

    #[test]
    fn ld_b_c_decodes_as_reg_reg() {
        let inst = decode(0x41, false); // LD B,C
        assert_eq!(inst.kind, Kind::Ld);
        assert_eq!(inst.mode, AddrMode::RegReg);
        assert_eq!(inst.reg_1, Operand::B);
        assert_eq!(inst.reg_2, Operand::C);
    }

    #[test]
    fn halt_is_special_cased_out_of_the_ld_block() {
        let inst = decode(0x76, false);
        assert_eq!(inst.kind, Kind::Halt);
    }

    #[test]
    fn alu_block_picks_up_cp_a_hl() {
        let inst = decode(0xBE, false); // CP (HL)
        assert_eq!(inst.kind, Kind::Cp);
        assert_eq!(inst.mode, AddrMode::RegMem);
        assert_eq!(inst.reg_2, Operand::HL);
    }

    #[test]
    fn cb_bit_block_carries_bit_index_in_param() {
        let inst = decode(0x7C, true); // BIT 7,H
        assert_eq!(inst.kind, Kind::Bit);
        assert_eq!(inst.reg_1, Operand::H);
        assert_eq!(inst.param, 7);
    }

    #[test]
    fn cb_block_on_hl_uses_mem_mode() {
        let inst = decode(0x86, true); // RES 0,(HL)
        assert_eq!(inst.kind, Kind::Res);
        assert_eq!(inst.mode, AddrMode::CbMemHl);
        assert_eq!(inst.param, 0);
    }

    #[test]
    fn illegal_opcodes_decode_as_invalid() {
        for op in [0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD] {
            assert_eq!(decode(op, false).kind, Kind::Invalid);
        }
    }
}
