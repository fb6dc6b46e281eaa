//! Table of the supported mnemonics.

use std::collections::HashMap;

use edit_distance::edit_distance;
use lazy_static::lazy_static;

use crate::instruction::{ImmediateOpCode, RegisterOpCode, TransferOpCode, ZeroTest};

/// What a mnemonic assembles into, before its operands are known.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Mnemonic {
    /// `Xd, Xn, Xm`
    Register(RegisterOpCode),
    /// `Xd, Xn, #imm`
    Immediate(ImmediateOpCode),
    /// `Xd, #imm{, LSL #shift}`
    WideMove(ImmediateOpCode),
    /// `Xd, Xn, Xm` or `Xd, Xn, #imm`, depending on the last operand.
    Shift(RegisterOpCode, ImmediateOpCode),
    /// `Xt, [Xn{, #offset}]`
    Transfer(TransferOpCode),
    /// `label`
    Branch,
    /// `label`
    BranchLink,
    /// `Xn`
    BranchRegister,
    /// `Xt, label`
    CompareBranch(ZeroTest),
    /// `CMP Xn, Xm`, assembled as `SUBS XZR, Xn, Xm`.
    Compare,
    /// `CMPI Xn, #imm`, assembled as `SUBIS XZR, Xn, #imm`.
    CompareImmediate,
    /// `MOV Xd, Xn`, assembled as `ORR Xd, XZR, Xn`.
    Move,
}

lazy_static! {
    static ref MNEMONICS: HashMap<&'static str, Mnemonic> = {
        use self::Mnemonic::*;

        let mut table = HashMap::new();

        table.insert("ADD", Register(RegisterOpCode::Add));
        table.insert("ADDS", Register(RegisterOpCode::AddS));
        table.insert("SUB", Register(RegisterOpCode::Sub));
        table.insert("SUBS", Register(RegisterOpCode::SubS));
        table.insert("AND", Register(RegisterOpCode::And));
        table.insert("ORR", Register(RegisterOpCode::Orr));
        table.insert("EOR", Register(RegisterOpCode::Eor));
        table.insert("MUL", Register(RegisterOpCode::Mul));
        table.insert("SDIV", Register(RegisterOpCode::SDiv));
        table.insert("UDIV", Register(RegisterOpCode::UDiv));
        table.insert("LSL", Shift(RegisterOpCode::Lsl, ImmediateOpCode::Lsl));
        table.insert("LSR", Shift(RegisterOpCode::Lsr, ImmediateOpCode::Lsr));

        table.insert("ADDI", Immediate(ImmediateOpCode::AddI));
        table.insert("ADDIS", Immediate(ImmediateOpCode::AddIS));
        table.insert("SUBI", Immediate(ImmediateOpCode::SubI));
        table.insert("SUBIS", Immediate(ImmediateOpCode::SubIS));
        table.insert("ANDI", Immediate(ImmediateOpCode::AndI));
        table.insert("ORRI", Immediate(ImmediateOpCode::OrrI));
        table.insert("EORI", Immediate(ImmediateOpCode::EorI));
        table.insert("MOVZ", WideMove(ImmediateOpCode::MovZ));
        table.insert("MOVK", WideMove(ImmediateOpCode::MovK));

        table.insert("LDUR", Transfer(TransferOpCode::Ldur));
        table.insert("STUR", Transfer(TransferOpCode::Stur));
        table.insert("LDURW", Transfer(TransferOpCode::LdurW));
        table.insert("STURW", Transfer(TransferOpCode::SturW));
        table.insert("LDURB", Transfer(TransferOpCode::LdurB));
        table.insert("STURB", Transfer(TransferOpCode::SturB));

        table.insert("B", Branch);
        table.insert("BL", BranchLink);
        table.insert("BR", BranchRegister);
        table.insert("CBZ", CompareBranch(ZeroTest::Zero));
        table.insert("CBNZ", CompareBranch(ZeroTest::NonZero));

        table.insert("CMP", Compare);
        table.insert("CMPI", CompareImmediate);
        table.insert("MOV", Move);

        table
    };
}

/// Looks up an (upper case) mnemonic.
pub fn lookup(mnemonic: &str) -> Option<Mnemonic> {
    MNEMONICS.get(mnemonic).copied()
}

/// Returns the known mnemonic closest to `mnemonic`, if it is within two edits.
pub fn suggest(mnemonic: &str) -> Option<&'static str> {
    MNEMONICS.keys()
        .map(|known| (edit_distance(known, mnemonic), *known))
        .filter(|(distance, _)| *distance <= 2)
        .min()
        .map(|(_, known)| known)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("ADDS"), Some(Mnemonic::Register(RegisterOpCode::AddS)));
        assert_eq!(lookup("CBNZ"), Some(Mnemonic::CompareBranch(ZeroTest::NonZero)));
        assert_eq!(lookup("add"), None);
        assert_eq!(lookup("FADD"), None);
    }

    #[test]
    fn test_suggest() {
        assert_eq!(suggest("LDRU"), Some("LDUR"));
        assert_eq!(suggest("MOVZZ"), Some("MOVZ"));
        assert_eq!(suggest("HALT"), None);
    }
}
