//! Calibration profile and its persisted record.
//!
//! Record layout (little-endian, 30 bytes):
//!
//! | offset | size | field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 2    | magic `b"GP"`                           |
//! | 2      | 1    | version (`1`)                           |
//! | 3      | 1    | reserved, written as 0                  |
//! | 4      | 24   | `(low u16, high u16)` per channel, in `Channel` order |
//! | 28     | 2    | Fletcher-16 over bytes `0..28`          |
//!
//! The layout is independent of the in-memory representation.

use gauge_traits::Channel;

use crate::error::ProfileError;

pub const RECORD_MAGIC: [u8; 2] = *b"GP";
pub const RECORD_VERSION: u8 = 1;
pub const RECORD_LEN: usize = 4 + Channel::COUNT * 4 + 2;

/// Raw bounds of one slider. `low` may be greater than `high`; the pair only
/// fixes which raw values are the ends of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBounds {
    pub low: u16,
    pub high: u16,
}

impl RawBounds {
    pub const fn new(low: u16, high: u16) -> Self {
        Self { low, high }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }

    /// Widen an equal pair by one raw unit each side, staying inside
    /// `[0, bound_max]`. Non-degenerate pairs are returned unchanged.
    pub fn widened(self, bound_max: u16) -> Self {
        if !self.is_degenerate() {
            return self;
        }
        let v = self.low.min(bound_max);
        let low = v.saturating_sub(1);
        let high = if v < bound_max { v + 1 } else { v };
        // v == bound_max == 0 is the only pair that cannot be widened upward
        if low == high {
            return Self::new(0, bound_max.max(1));
        }
        Self::new(low, high)
    }
}

/// `(low, high)` raw bounds for every channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationProfile {
    bounds: [RawBounds; Channel::COUNT],
}

impl CalibrationProfile {
    pub const fn new(bounds: [RawBounds; Channel::COUNT]) -> Self {
        Self { bounds }
    }

    #[inline]
    pub fn bounds(&self, channel: Channel) -> RawBounds {
        self.bounds[channel.index()]
    }

    pub fn set_bounds(&mut self, channel: Channel, bounds: RawBounds) {
        self.bounds[channel.index()] = bounds;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, RawBounds)> + '_ {
        Channel::ALL.into_iter().map(|c| (c, self.bounds(c)))
    }

    /// Replace every degenerate pair with a widened one (see
    /// `RawBounds::widened`), logging each substitution.
    pub fn sanitized(mut self, bound_max: u16) -> Self {
        for ch in Channel::ALL {
            let b = self.bounds(ch);
            if b.is_degenerate() {
                let w = b.widened(bound_max);
                tracing::warn!(
                    channel = ch.name(),
                    raw = b.low,
                    low = w.low,
                    high = w.high,
                    "degenerate calibration bounds widened"
                );
                self.set_bounds(ch, w);
            }
        }
        self
    }

    pub fn to_record(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..2].copy_from_slice(&RECORD_MAGIC);
        out[2] = RECORD_VERSION;
        out[3] = 0;
        for ch in Channel::ALL {
            let b = self.bounds(ch);
            let at = 4 + ch.index() * 4;
            out[at..at + 2].copy_from_slice(&b.low.to_le_bytes());
            out[at + 2..at + 4].copy_from_slice(&b.high.to_le_bytes());
        }
        let sum = fletcher16(&out[..RECORD_LEN - 2]);
        out[RECORD_LEN - 2..].copy_from_slice(&sum.to_le_bytes());
        out
    }

    /// Decode a record. Trailing bytes beyond `RECORD_LEN` are ignored.
    /// Degenerate pairs are accepted here; callers sanitize before mapping.
    pub fn from_record(bytes: &[u8], bound_max: u16) -> Result<Self, ProfileError> {
        if bytes.len() < RECORD_LEN {
            return Err(ProfileError::Truncated(bytes.len()));
        }
        let rec = &bytes[..RECORD_LEN];
        if rec[0..2] != RECORD_MAGIC {
            return Err(ProfileError::BadMagic);
        }
        if rec[2] != RECORD_VERSION {
            return Err(ProfileError::UnsupportedVersion(rec[2]));
        }
        let stored = u16::from_le_bytes([rec[RECORD_LEN - 2], rec[RECORD_LEN - 1]]);
        let computed = fletcher16(&rec[..RECORD_LEN - 2]);
        if stored != computed {
            return Err(ProfileError::Checksum { stored, computed });
        }

        let mut bounds = [RawBounds::new(0, 0); Channel::COUNT];
        for ch in Channel::ALL {
            let at = 4 + ch.index() * 4;
            let low = u16::from_le_bytes([rec[at], rec[at + 1]]);
            let high = u16::from_le_bytes([rec[at + 2], rec[at + 3]]);
            for value in [low, high] {
                if value > bound_max {
                    return Err(ProfileError::OutOfRange {
                        channel: ch.name(),
                        value,
                        max: bound_max,
                    });
                }
            }
            bounds[ch.index()] = RawBounds::new(low, high);
        }
        Ok(Self { bounds })
    }
}

impl From<gauge_config::ProfileBounds> for CalibrationProfile {
    fn from(b: gauge_config::ProfileBounds) -> Self {
        let mut bounds = [RawBounds::new(0, 0); Channel::COUNT];
        for (slot, (low, high)) in bounds.iter_mut().zip(b) {
            *slot = RawBounds::new(low, high);
        }
        Self { bounds }
    }
}

impl From<&CalibrationProfile> for gauge_config::ProfileBounds {
    fn from(p: &CalibrationProfile) -> Self {
        let mut out = [(0, 0); Channel::COUNT];
        for (ch, b) in p.iter() {
            out[ch.index()] = (b.low, b.high);
        }
        out
    }
}

/// Fletcher-16 checksum (mod 255 sums).
pub fn fletcher16(data: &[u8]) -> u16 {
    let mut a: u16 = 0;
    let mut b: u16 = 0;
    for &byte in data {
        a = (a + u16::from(byte)) % 255;
        b = (b + a) % 255;
    }
    (b << 8) | a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fletcher_known_vector() {
        // "abcde" -> 0xC8F0
        assert_eq!(fletcher16(b"abcde"), 0xC8F0);
    }

    #[test]
    fn widening_stays_in_range() {
        assert_eq!(RawBounds::new(500, 500).widened(1023), RawBounds::new(499, 501));
        assert_eq!(RawBounds::new(0, 0).widened(1023), RawBounds::new(0, 1));
        assert_eq!(RawBounds::new(1023, 1023).widened(1023), RawBounds::new(1022, 1023));
        assert_eq!(RawBounds::new(10, 20).widened(1023), RawBounds::new(10, 20));
    }

    #[test]
    fn record_has_fixed_length_and_header() {
        let p = CalibrationProfile::new([RawBounds::new(1, 2); Channel::COUNT]);
        let rec = p.to_record();
        assert_eq!(rec.len(), 30);
        assert_eq!(&rec[0..2], b"GP");
        assert_eq!(rec[2], RECORD_VERSION);
        // shower low, little-endian
        assert_eq!(&rec[4..6], &[1, 0]);
    }
}
