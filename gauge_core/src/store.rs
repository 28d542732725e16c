//! Profile persistence on top of a [`BlockStore`].

use gauge_traits::{BlockStore, StoreError};

use crate::profile::CalibrationProfile;

/// Where the profile returned by [`ProfileStore::load`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    /// Nothing stored yet.
    Empty,
    /// The block could not be read or did not decode.
    Fallback,
}

/// Number of writes attempted by [`ProfileStore::commit`].
pub const COMMIT_ATTEMPTS: u32 = 2;

pub struct ProfileStore<P: BlockStore> {
    inner: P,
    bound_max: u16,
    fallback: CalibrationProfile,
}

impl<P: BlockStore> ProfileStore<P> {
    /// `fallback` is returned whenever no valid profile is stored.
    pub fn new(inner: P, bound_max: u16, fallback: CalibrationProfile) -> Self {
        Self {
            inner,
            bound_max,
            fallback,
        }
    }

    pub fn fallback(&self) -> &CalibrationProfile {
        &self.fallback
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Load the stored profile. Never fails: a missing, unreadable or
    /// corrupt block yields the fallback profile and a warning.
    pub fn load(&mut self) -> CalibrationProfile {
        self.load_with_source().0
    }

    pub fn load_with_source(&mut self) -> (CalibrationProfile, LoadSource) {
        match self.inner.load_block() {
            Ok(Some(bytes)) => match CalibrationProfile::from_record(&bytes, self.bound_max) {
                Ok(p) => {
                    tracing::debug!("calibration profile loaded");
                    (p.sanitized(self.bound_max), LoadSource::Stored)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored profile rejected; using defaults");
                    (self.fallback, LoadSource::Fallback)
                }
            },
            Ok(None) => {
                tracing::info!("no stored profile; using defaults");
                (self.fallback, LoadSource::Empty)
            }
            Err(e) => {
                tracing::warn!(error = %e, "profile store unavailable; using defaults");
                (self.fallback, LoadSource::Fallback)
            }
        }
    }

    /// Single write of the encoded record.
    pub fn save(&mut self, profile: &CalibrationProfile) -> Result<(), StoreError> {
        self.inner.save_block(&profile.to_record())
    }

    /// Write with one retry. The last error is returned when both attempts
    /// fail; the block store is expected to leave the previous record intact.
    pub fn commit(&mut self, profile: &CalibrationProfile) -> Result<(), StoreError> {
        let mut attempt = 1;
        loop {
            match self.save(profile) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < COMMIT_ATTEMPTS => {
                    tracing::warn!(error = %e, attempt, "profile write failed; retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<P: BlockStore> core::fmt::Debug for ProfileStore<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProfileStore")
            .field("bound_max", &self.bound_max)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}
