pub mod channel;
pub mod clock;

pub use channel::Channel;
pub use clock::{Clock, ManualClock, MonotonicClock};

use thiserror::Error;

/// Source of raw slider positions (one ADC conversion per call).
pub trait SensorSource {
    fn read(&mut self, channel: Channel) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

/// The calibration push button, polled once per tick. Returns the raw
/// (undebounced) level.
pub trait ButtonInput {
    fn is_pressed(&mut self) -> bool;
}

/// LED matrix (or stand-in) the gauge renders into.
pub trait DisplaySurface {
    fn clear(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn draw_digits(
        &mut self,
        value: u16,
        hue: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn draw_label(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn present(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store write failed: {0}")]
    WriteFailed(String),
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable storage for one opaque block (the calibration profile record).
///
/// `save_block` must replace the previous block atomically: after a failed
/// save, `load_block` still returns the previous contents.
pub trait BlockStore {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load_block(&mut self) -> Result<Option<Vec<u8>>, StoreError>;
    fn save_block(&mut self, block: &[u8]) -> Result<(), StoreError>;
}

impl<T: SensorSource + ?Sized> SensorSource for Box<T> {
    fn read(&mut self, channel: Channel) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(channel)
    }
}

impl<T: ButtonInput + ?Sized> ButtonInput for Box<T> {
    fn is_pressed(&mut self) -> bool {
        (**self).is_pressed()
    }
}

impl<T: BlockStore + ?Sized> BlockStore for Box<T> {
    fn load_block(&mut self) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load_block()
    }
    fn save_block(&mut self, block: &[u8]) -> Result<(), StoreError> {
        (**self).save_block(block)
    }
}

impl<T: DisplaySurface + ?Sized> DisplaySurface for Box<T> {
    fn clear(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).clear()
    }
    fn draw_digits(
        &mut self,
        value: u16,
        hue: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).draw_digits(value, hue)
    }
    fn draw_label(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).draw_label(text)
    }
    fn present(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).present()
    }
}
