//! MCP3008 wire framing, kept free of any bus type so it can be tested
//! off-target.

use crate::error::{HwError, Result};

/// Number of single-ended inputs on the converter.
pub const MCP3008_INPUTS: u8 = 8;

/// Three-byte request for a single-ended conversion of `input`:
/// start bit, then single/diff + D2..D0 in the high nibble, then padding.
pub fn mcp3008_request(input: u8) -> Result<[u8; 3]> {
    if input >= MCP3008_INPUTS {
        return Err(HwError::InvalidChannel(input));
    }
    Ok([0x01, (0x08 | input) << 4, 0x00])
}

/// 10-bit result from the reply: low two bits of byte 1, all of byte 2.
#[inline]
pub fn mcp3008_decode(rx: &[u8; 3]) -> u16 {
    (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_encodes_single_ended_input() {
        assert_eq!(mcp3008_request(0).unwrap(), [0x01, 0x80, 0x00]);
        assert_eq!(mcp3008_request(5).unwrap(), [0x01, 0xD0, 0x00]);
        assert_eq!(mcp3008_request(7).unwrap(), [0x01, 0xF0, 0x00]);
        assert!(matches!(mcp3008_request(8), Err(HwError::InvalidChannel(8))));
    }

    #[test]
    fn decode_ignores_null_bit_and_garbage() {
        assert_eq!(mcp3008_decode(&[0xFF, 0xFF, 0xFF]), 1023);
        assert_eq!(mcp3008_decode(&[0x00, 0x02, 0x00]), 512);
        assert_eq!(mcp3008_decode(&[0x00, 0xFC, 0x2A]), 42);
    }
}
