//! U29 variable-length integer
//!
//! AMF3 packs integers into 1-4 bytes. The first three bytes carry 7 bits
//! each with the high bit as a continuation flag; a fourth byte, when
//! present, carries a full 8 bits:
//!
//! ```text
//! 0x00000000 - 0x0000007F : 0xxxxxxx
//! 0x00000080 - 0x00003FFF : 1xxxxxxx 0xxxxxxx
//! 0x00004000 - 0x001FFFFF : 1xxxxxxx 1xxxxxxx 0xxxxxxx
//! 0x00200000 - 0x3FFFFFFF : 1xxxxxxx 1xxxxxxx 1xxxxxxx xxxxxxxx
//! ```
//!
//! Negative values always take the 4-byte form. Only the low 29 bits are
//! significant; callers route anything outside ±2^28 to a double first.

use bytes::BufMut;

/// Write `n` as a U29. Returns the number of bytes written.
pub fn write_u29<B: BufMut>(buf: &mut B, n: i32) -> usize {
    let n = n as u32;

    if n & 0xFFFF_FF80 == 0 {
        buf.put_u8((n & 0x7F) as u8);
        return 1;
    }

    if n & 0xFFFF_C000 == 0 {
        buf.put_u8(((n >> 7) as u8) | 0x80);
        buf.put_u8((n & 0x7F) as u8);
        return 2;
    }

    if n & 0xFFE0_0000 == 0 {
        buf.put_u8(((n >> 14) as u8) | 0x80);
        buf.put_u8(((n >> 7) as u8) | 0x80);
        buf.put_u8((n & 0x7F) as u8);
        return 3;
    }

    buf.put_u8(((n >> 22) as u8) | 0x80);
    buf.put_u8(((n >> 15) as u8) | 0x80);
    buf.put_u8(((n >> 8) as u8) | 0x80);
    buf.put_u8((n & 0xFF) as u8);
    4
}
