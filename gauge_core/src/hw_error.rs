//! Maps `Box<dyn Error>` from trait boundaries to typed `GaugeError`.
//!
//! The traits in `gauge_traits` use `Box<dyn Error + Send + Sync>`; this
//! module converts those to our error enum, with an optional feature-gated
//! path for `gauge_hardware::HwError` downcasting.

use crate::error::GaugeError;

/// Map a trait-boundary error to a typed `GaugeError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> GaugeError {
    #[cfg(feature = "hardware-errors")]
    {
        use gauge_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::InvalidChannel(_) => GaugeError::Config(hw.to_string()),
                other => GaugeError::HardwareFault(other.to_string()),
            };
        }
    }

    GaugeError::Hardware(e.to_string())
}
