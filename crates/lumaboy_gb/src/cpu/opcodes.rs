//! Static opcode metadata for the LR35902 instruction set.
//!
//! The executor in `exec` decodes opcodes by bit pattern; this table is the
//! reference it is checked against (operand width and cycle cost per
//! opcode) and the source for trace-level disassembly.

use super::Bus;

/// Metadata for one unprefixed opcode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OpInfo {
    /// Assembly mnemonic with operand placeholders (`d8`, `d16`, `a8`,
    /// `a16`, `r8`).
    pub mnemonic: &'static str,
    /// Instruction length in bytes, including the opcode.
    pub len: u8,
    /// T-cycles when a conditional branch is not taken (or always, for
    /// unconditional instructions).
    pub cycles: u8,
    /// T-cycles when a conditional branch is taken.
    pub taken_cycles: u8,
}

impl OpInfo {
    /// Opcode holes that hard-lock the CPU.
    #[inline]
    pub const fn is_illegal(&self) -> bool {
        self.cycles == 0
    }

    #[inline]
    pub const fn is_conditional(&self) -> bool {
        self.cycles != self.taken_cycles
    }
}

const fn op(mnemonic: &'static str, len: u8, cycles: u8, taken_cycles: u8) -> OpInfo {
    OpInfo {
        mnemonic,
        len,
        cycles,
        taken_cycles,
    }
}

/// Unprefixed instruction table, indexed by opcode.
pub static OPCODES: [OpInfo; 256] = [
    op("NOP", 1, 4, 4), // 0x00
    op("LD BC,d16", 3, 12, 12), // 0x01
    op("LD (BC),A", 1, 8, 8), // 0x02
    op("INC BC", 1, 8, 8), // 0x03
    op("INC B", 1, 4, 4), // 0x04
    op("DEC B", 1, 4, 4), // 0x05
    op("LD B,d8", 2, 8, 8), // 0x06
    op("RLCA", 1, 4, 4), // 0x07
    op("LD (a16),SP", 3, 20, 20), // 0x08
    op("ADD HL,BC", 1, 8, 8), // 0x09
    op("LD A,(BC)", 1, 8, 8), // 0x0A
    op("DEC BC", 1, 8, 8), // 0x0B
    op("INC C", 1, 4, 4), // 0x0C
    op("DEC C", 1, 4, 4), // 0x0D
    op("LD C,d8", 2, 8, 8), // 0x0E
    op("RRCA", 1, 4, 4), // 0x0F
    op("STOP", 2, 4, 4), // 0x10
    op("LD DE,d16", 3, 12, 12), // 0x11
    op("LD (DE),A", 1, 8, 8), // 0x12
    op("INC DE", 1, 8, 8), // 0x13
    op("INC D", 1, 4, 4), // 0x14
    op("DEC D", 1, 4, 4), // 0x15
    op("LD D,d8", 2, 8, 8), // 0x16
    op("RLA", 1, 4, 4), // 0x17
    op("JR r8", 2, 12, 12), // 0x18
    op("ADD HL,DE", 1, 8, 8), // 0x19
    op("LD A,(DE)", 1, 8, 8), // 0x1A
    op("DEC DE", 1, 8, 8), // 0x1B
    op("INC E", 1, 4, 4), // 0x1C
    op("DEC E", 1, 4, 4), // 0x1D
    op("LD E,d8", 2, 8, 8), // 0x1E
    op("RRA", 1, 4, 4), // 0x1F
    op("JR NZ,r8", 2, 8, 12), // 0x20
    op("LD HL,d16", 3, 12, 12), // 0x21
    op("LD (HL+),A", 1, 8, 8), // 0x22
    op("INC HL", 1, 8, 8), // 0x23
    op("INC H", 1, 4, 4), // 0x24
    op("DEC H", 1, 4, 4), // 0x25
    op("LD H,d8", 2, 8, 8), // 0x26
    op("DAA", 1, 4, 4), // 0x27
    op("JR Z,r8", 2, 8, 12), // 0x28
    op("ADD HL,HL", 1, 8, 8), // 0x29
    op("LD A,(HL+)", 1, 8, 8), // 0x2A
    op("DEC HL", 1, 8, 8), // 0x2B
    op("INC L", 1, 4, 4), // 0x2C
    op("DEC L", 1, 4, 4), // 0x2D
    op("LD L,d8", 2, 8, 8), // 0x2E
    op("CPL", 1, 4, 4), // 0x2F
    op("JR NC,r8", 2, 8, 12), // 0x30
    op("LD SP,d16", 3, 12, 12), // 0x31
    op("LD (HL-),A", 1, 8, 8), // 0x32
    op("INC SP", 1, 8, 8), // 0x33
    op("INC (HL)", 1, 12, 12), // 0x34
    op("DEC (HL)", 1, 12, 12), // 0x35
    op("LD (HL),d8", 2, 12, 12), // 0x36
    op("SCF", 1, 4, 4), // 0x37
    op("JR C,r8", 2, 8, 12), // 0x38
    op("ADD HL,SP", 1, 8, 8), // 0x39
    op("LD A,(HL-)", 1, 8, 8), // 0x3A
    op("DEC SP", 1, 8, 8), // 0x3B
    op("INC A", 1, 4, 4), // 0x3C
    op("DEC A", 1, 4, 4), // 0x3D
    op("LD A,d8", 2, 8, 8), // 0x3E
    op("CCF", 1, 4, 4), // 0x3F
    op("LD B,B", 1, 4, 4), // 0x40
    op("LD B,C", 1, 4, 4), // 0x41
    op("LD B,D", 1, 4, 4), // 0x42
    op("LD B,E", 1, 4, 4), // 0x43
    op("LD B,H", 1, 4, 4), // 0x44
    op("LD B,L", 1, 4, 4), // 0x45
    op("LD B,(HL)", 1, 8, 8), // 0x46
    op("LD B,A", 1, 4, 4), // 0x47
    op("LD C,B", 1, 4, 4), // 0x48
    op("LD C,C", 1, 4, 4), // 0x49
    op("LD C,D", 1, 4, 4), // 0x4A
    op("LD C,E", 1, 4, 4), // 0x4B
    op("LD C,H", 1, 4, 4), // 0x4C
    op("LD C,L", 1, 4, 4), // 0x4D
    op("LD C,(HL)", 1, 8, 8), // 0x4E
    op("LD C,A", 1, 4, 4), // 0x4F
    op("LD D,B", 1, 4, 4), // 0x50
    op("LD D,C", 1, 4, 4), // 0x51
    op("LD D,D", 1, 4, 4), // 0x52
    op("LD D,E", 1, 4, 4), // 0x53
    op("LD D,H", 1, 4, 4), // 0x54
    op("LD D,L", 1, 4, 4), // 0x55
    op("LD D,(HL)", 1, 8, 8), // 0x56
    op("LD D,A", 1, 4, 4), // 0x57
    op("LD E,B", 1, 4, 4), // 0x58
    op("LD E,C", 1, 4, 4), // 0x59
    op("LD E,D", 1, 4, 4), // 0x5A
    op("LD E,E", 1, 4, 4), // 0x5B
    op("LD E,H", 1, 4, 4), // 0x5C
    op("LD E,L", 1, 4, 4), // 0x5D
    op("LD E,(HL)", 1, 8, 8), // 0x5E
    op("LD E,A", 1, 4, 4), // 0x5F
    op("LD H,B", 1, 4, 4), // 0x60
    op("LD H,C", 1, 4, 4), // 0x61
    op("LD H,D", 1, 4, 4), // 0x62
    op("LD H,E", 1, 4, 4), // 0x63
    op("LD H,H", 1, 4, 4), // 0x64
    op("LD H,L", 1, 4, 4), // 0x65
    op("LD H,(HL)", 1, 8, 8), // 0x66
    op("LD H,A", 1, 4, 4), // 0x67
    op("LD L,B", 1, 4, 4), // 0x68
    op("LD L,C", 1, 4, 4), // 0x69
    op("LD L,D", 1, 4, 4), // 0x6A
    op("LD L,E", 1, 4, 4), // 0x6B
    op("LD L,H", 1, 4, 4), // 0x6C
    op("LD L,L", 1, 4, 4), // 0x6D
    op("LD L,(HL)", 1, 8, 8), // 0x6E
    op("LD L,A", 1, 4, 4), // 0x6F
    op("LD (HL),B", 1, 8, 8), // 0x70
    op("LD (HL),C", 1, 8, 8), // 0x71
    op("LD (HL),D", 1, 8, 8), // 0x72
    op("LD (HL),E", 1, 8, 8), // 0x73
    op("LD (HL),H", 1, 8, 8), // 0x74
    op("LD (HL),L", 1, 8, 8), // 0x75
    op("HALT", 1, 4, 4), // 0x76
    op("LD (HL),A", 1, 8, 8), // 0x77
    op("LD A,B", 1, 4, 4), // 0x78
    op("LD A,C", 1, 4, 4), // 0x79
    op("LD A,D", 1, 4, 4), // 0x7A
    op("LD A,E", 1, 4, 4), // 0x7B
    op("LD A,H", 1, 4, 4), // 0x7C
    op("LD A,L", 1, 4, 4), // 0x7D
    op("LD A,(HL)", 1, 8, 8), // 0x7E
    op("LD A,A", 1, 4, 4), // 0x7F
    op("ADD A,B", 1, 4, 4), // 0x80
    op("ADD A,C", 1, 4, 4), // 0x81
    op("ADD A,D", 1, 4, 4), // 0x82
    op("ADD A,E", 1, 4, 4), // 0x83
    op("ADD A,H", 1, 4, 4), // 0x84
    op("ADD A,L", 1, 4, 4), // 0x85
    op("ADD A,(HL)", 1, 8, 8), // 0x86
    op("ADD A,A", 1, 4, 4), // 0x87
    op("ADC A,B", 1, 4, 4), // 0x88
    op("ADC A,C", 1, 4, 4), // 0x89
    op("ADC A,D", 1, 4, 4), // 0x8A
    op("ADC A,E", 1, 4, 4), // 0x8B
    op("ADC A,H", 1, 4, 4), // 0x8C
    op("ADC A,L", 1, 4, 4), // 0x8D
    op("ADC A,(HL)", 1, 8, 8), // 0x8E
    op("ADC A,A", 1, 4, 4), // 0x8F
    op("SUB B", 1, 4, 4), // 0x90
    op("SUB C", 1, 4, 4), // 0x91
    op("SUB D", 1, 4, 4), // 0x92
    op("SUB E", 1, 4, 4), // 0x93
    op("SUB H", 1, 4, 4), // 0x94
    op("SUB L", 1, 4, 4), // 0x95
    op("SUB (HL)", 1, 8, 8), // 0x96
    op("SUB A", 1, 4, 4), // 0x97
    op("SBC A,B", 1, 4, 4), // 0x98
    op("SBC A,C", 1, 4, 4), // 0x99
    op("SBC A,D", 1, 4, 4), // 0x9A
    op("SBC A,E", 1, 4, 4), // 0x9B
    op("SBC A,H", 1, 4, 4), // 0x9C
    op("SBC A,L", 1, 4, 4), // 0x9D
    op("SBC A,(HL)", 1, 8, 8), // 0x9E
    op("SBC A,A", 1, 4, 4), // 0x9F
    op("AND B", 1, 4, 4), // 0xA0
    op("AND C", 1, 4, 4), // 0xA1
    op("AND D", 1, 4, 4), // 0xA2
    op("AND E", 1, 4, 4), // 0xA3
    op("AND H", 1, 4, 4), // 0xA4
    op("AND L", 1, 4, 4), // 0xA5
    op("AND (HL)", 1, 8, 8), // 0xA6
    op("AND A", 1, 4, 4), // 0xA7
    op("XOR B", 1, 4, 4), // 0xA8
    op("XOR C", 1, 4, 4), // 0xA9
    op("XOR D", 1, 4, 4), // 0xAA
    op("XOR E", 1, 4, 4), // 0xAB
    op("XOR H", 1, 4, 4), // 0xAC
    op("XOR L", 1, 4, 4), // 0xAD
    op("XOR (HL)", 1, 8, 8), // 0xAE
    op("XOR A", 1, 4, 4), // 0xAF
    op("OR B", 1, 4, 4), // 0xB0
    op("OR C", 1, 4, 4), // 0xB1
    op("OR D", 1, 4, 4), // 0xB2
    op("OR E", 1, 4, 4), // 0xB3
    op("OR H", 1, 4, 4), // 0xB4
    op("OR L", 1, 4, 4), // 0xB5
    op("OR (HL)", 1, 8, 8), // 0xB6
    op("OR A", 1, 4, 4), // 0xB7
    op("CP B", 1, 4, 4), // 0xB8
    op("CP C", 1, 4, 4), // 0xB9
    op("CP D", 1, 4, 4), // 0xBA
    op("CP E", 1, 4, 4), // 0xBB
    op("CP H", 1, 4, 4), // 0xBC
    op("CP L", 1, 4, 4), // 0xBD
    op("CP (HL)", 1, 8, 8), // 0xBE
    op("CP A", 1, 4, 4), // 0xBF
    op("RET NZ", 1, 8, 20), // 0xC0
    op("POP BC", 1, 12, 12), // 0xC1
    op("JP NZ,a16", 3, 12, 16), // 0xC2
    op("JP a16", 3, 16, 16), // 0xC3
    op("CALL NZ,a16", 3, 12, 24), // 0xC4
    op("PUSH BC", 1, 16, 16), // 0xC5
    op("ADD A,d8", 2, 8, 8), // 0xC6
    op("RST 00H", 1, 16, 16), // 0xC7
    op("RET Z", 1, 8, 20), // 0xC8
    op("RET", 1, 16, 16), // 0xC9
    op("JP Z,a16", 3, 12, 16), // 0xCA
    op("PREFIX CB", 1, 4, 4), // 0xCB
    op("CALL Z,a16", 3, 12, 24), // 0xCC
    op("CALL a16", 3, 24, 24), // 0xCD
    op("ADC A,d8", 2, 8, 8), // 0xCE
    op("RST 08H", 1, 16, 16), // 0xCF
    op("RET NC", 1, 8, 20), // 0xD0
    op("POP DE", 1, 12, 12), // 0xD1
    op("JP NC,a16", 3, 12, 16), // 0xD2
    op("ILLEGAL", 1, 0, 0), // 0xD3
    op("CALL NC,a16", 3, 12, 24), // 0xD4
    op("PUSH DE", 1, 16, 16), // 0xD5
    op("SUB d8", 2, 8, 8), // 0xD6
    op("RST 10H", 1, 16, 16), // 0xD7
    op("RET C", 1, 8, 20), // 0xD8
    op("RETI", 1, 16, 16), // 0xD9
    op("JP C,a16", 3, 12, 16), // 0xDA
    op("ILLEGAL", 1, 0, 0), // 0xDB
    op("CALL C,a16", 3, 12, 24), // 0xDC
    op("ILLEGAL", 1, 0, 0), // 0xDD
    op("SBC A,d8", 2, 8, 8), // 0xDE
    op("RST 18H", 1, 16, 16), // 0xDF
    op("LDH (a8),A", 2, 12, 12), // 0xE0
    op("POP HL", 1, 12, 12), // 0xE1
    op("LD (C),A", 1, 8, 8), // 0xE2
    op("ILLEGAL", 1, 0, 0), // 0xE3
    op("ILLEGAL", 1, 0, 0), // 0xE4
    op("PUSH HL", 1, 16, 16), // 0xE5
    op("AND d8", 2, 8, 8), // 0xE6
    op("RST 20H", 1, 16, 16), // 0xE7
    op("ADD SP,r8", 2, 16, 16), // 0xE8
    op("JP (HL)", 1, 4, 4), // 0xE9
    op("LD (a16),A", 3, 16, 16), // 0xEA
    op("ILLEGAL", 1, 0, 0), // 0xEB
    op("ILLEGAL", 1, 0, 0), // 0xEC
    op("ILLEGAL", 1, 0, 0), // 0xED
    op("XOR d8", 2, 8, 8), // 0xEE
    op("RST 28H", 1, 16, 16), // 0xEF
    op("LDH A,(a8)", 2, 12, 12), // 0xF0
    op("POP AF", 1, 12, 12), // 0xF1
    op("LD A,(C)", 1, 8, 8), // 0xF2
    op("DI", 1, 4, 4), // 0xF3
    op("ILLEGAL", 1, 0, 0), // 0xF4
    op("PUSH AF", 1, 16, 16), // 0xF5
    op("OR d8", 2, 8, 8), // 0xF6
    op("RST 30H", 1, 16, 16), // 0xF7
    op("LD HL,SP+r8", 2, 12, 12), // 0xF8
    op("LD SP,HL", 1, 8, 8), // 0xF9
    op("LD A,(a16)", 3, 16, 16), // 0xFA
    op("EI", 1, 4, 4), // 0xFB
    op("ILLEGAL", 1, 0, 0), // 0xFC
    op("ILLEGAL", 1, 0, 0), // 0xFD
    op("CP d8", 2, 8, 8), // 0xFE
    op("RST 38H", 1, 16, 16), // 0xFF
];

const CB_OPS: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];
const REG_NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];

/// Mnemonic and T-cycle cost (prefix byte included) of a CB-prefixed opcode.
pub fn cb_info(opcode: u8) -> (String, u8) {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 0x07;
    let z = (opcode & 0x07) as usize;
    let hl = z == 6;
    match x {
        0 => (
            format!("{} {}", CB_OPS[y as usize], REG_NAMES[z]),
            if hl { 16 } else { 8 },
        ),
        1 => (format!("BIT {y},{}", REG_NAMES[z]), if hl { 12 } else { 8 }),
        2 => (format!("RES {y},{}", REG_NAMES[z]), if hl { 16 } else { 8 }),
        _ => (format!("SET {y},{}", REG_NAMES[z]), if hl { 16 } else { 8 }),
    }
}

/// Disassemble the instruction at `pc` without side effects on the CPU.
///
/// Returns the formatted instruction and its length in bytes. Operands are
/// read through `bus`, so this must only be used on buses where reads have
/// no side effects in the address range being decoded (ROM/RAM).
pub fn disassemble<B: Bus>(bus: &mut B, pc: u16) -> (String, u8) {
    let opcode = bus.read8(pc);
    if opcode == 0xCB {
        let (text, _) = cb_info(bus.read8(pc.wrapping_add(1)));
        return (text, 2);
    }

    let info = &OPCODES[opcode as usize];
    let b1 = bus.read8(pc.wrapping_add(1));
    let text = match info.len {
        2 if info.mnemonic.starts_with("JR") => {
            let target = pc.wrapping_add(2).wrapping_add(b1 as i8 as u16);
            info.mnemonic.replace("r8", &format!("${target:04X}"))
        }
        2 if info.mnemonic.contains("r8") => {
            info.mnemonic.replace("r8", &format!("{}", b1 as i8))
        }
        2 if info.mnemonic.contains("a8") => info.mnemonic.replace("a8", &format!("$FF{b1:02X}")),
        2 => info.mnemonic.replace("d8", &format!("${b1:02X}")),
        3 => {
            let b2 = bus.read8(pc.wrapping_add(2));
            let imm = u16::from_le_bytes([b1, b2]);
            info.mnemonic
                .replace("d16", &format!("${imm:04X}"))
                .replace("a16", &format!("${imm:04X}"))
        }
        _ if info.is_illegal() => format!("ILLEGAL ${opcode:02X}"),
        _ => info.mnemonic.to_string(),
    };
    (text, info.len)
}
