use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum GaugeError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor source")]
    MissingSensors,
    #[error("missing calibration button")]
    MissingButton,
    #[error("missing profile store")]
    MissingStore,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

/// Why a stored profile record was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile record too short: {0} bytes")]
    Truncated(usize),
    #[error("profile record has bad magic")]
    BadMagic,
    #[error("unsupported profile record version {0}")]
    UnsupportedVersion(u8),
    #[error("profile record checksum mismatch (stored {stored:#06x}, computed {computed:#06x})")]
    Checksum { stored: u16, computed: u16 },
    #[error("bound {value} for {channel} exceeds full scale {max}")]
    OutOfRange {
        channel: &'static str,
        value: u16,
        max: u16,
    },
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
