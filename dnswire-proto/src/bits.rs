//! Accessors for the bit fields packed into the two flag bytes of a header.
//!
//! ```text
//!   byte 2:  QR | OPCODE (4) | AA | TC | RD
//!   byte 3:  RA | Z (3)      | RCODE (4)
//! ```
//!
//! Only the low three RCODE bits are read; the six response codes of RFC 1035 all fit
//! into them.

const QR: u8 = 0b1000_0000;
const OPCODE: u8 = 0b0111_1000;
const OPCODE_SHIFT: u8 = 3;
const AA: u8 = 0b0000_0100;
const TC: u8 = 0b0000_0010;
const RD: u8 = 0b0000_0001;

const RA: u8 = 0b1000_0000;
const RCODE: u8 = 0b0000_0111;

/// Query (`false`) or response (`true`).
pub(crate) fn qr(byte2: u8) -> bool {
    byte2 & QR != 0
}

pub(crate) fn opcode(byte2: u8) -> u8 {
    (byte2 & OPCODE) >> OPCODE_SHIFT
}

/// Authoritative answer.
pub(crate) fn aa(byte2: u8) -> bool {
    byte2 & AA != 0
}

/// Truncation.
pub(crate) fn tc(byte2: u8) -> bool {
    byte2 & TC != 0
}

/// Recursion desired.
pub(crate) fn rd(byte2: u8) -> bool {
    byte2 & RD != 0
}

/// Recursion available.
pub(crate) fn ra(byte3: u8) -> bool {
    byte3 & RA != 0
}

pub(crate) fn rcode(byte3: u8) -> u8 {
    byte3 & RCODE
}

/// Packs the fields of byte 2. Bits of `opcode` beyond the field's four bits are dropped.
pub(crate) fn pack_byte2(qr: bool, opcode: u8, aa: bool, tc: bool, rd: bool) -> u8 {
    let mut byte = (opcode << OPCODE_SHIFT) & OPCODE;
    if qr {
        byte |= QR;
    }
    if aa {
        byte |= AA;
    }
    if tc {
        byte |= TC;
    }
    if rd {
        byte |= RD;
    }
    byte
}

/// Packs the fields of byte 3. Bits of `rcode` beyond the three read bits are dropped.
pub(crate) fn pack_byte3(ra: bool, rcode: u8) -> u8 {
    let mut byte = rcode & RCODE;
    if ra {
        byte |= RA;
    }
    byte
}
