//! Raspberry Pi drivers: MCP3008 over SPI for the sliders and a GPIO button.

use gauge_traits::{ButtonInput, Channel, SensorSource};
use rppal::gpio::{Gpio, InputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::error::{HwError, Result};
use crate::util::{MCP3008_INPUTS, mcp3008_decode, mcp3008_request};

fn spi_bus(n: u8) -> Result<Bus> {
    Ok(match n {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        other => return Err(HwError::Spi(format!("no SPI bus {other}"))),
    })
}

fn slave_select(n: u8) -> Result<SlaveSelect> {
    Ok(match n {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        other => return Err(HwError::Spi(format!("no slave select {other}"))),
    })
}

/// Six sliders on one MCP3008, `inputs[channel.index()]` naming the ADC
/// input each logical channel is wired to.
pub struct Mcp3008 {
    spi: Spi,
    inputs: [u8; Channel::COUNT],
}

impl Mcp3008 {
    pub fn new(bus: u8, ss: u8, clock_hz: u32, inputs: [u8; Channel::COUNT]) -> Result<Self> {
        if let Some(&bad) = inputs.iter().find(|&&i| i >= MCP3008_INPUTS) {
            return Err(HwError::InvalidChannel(bad));
        }
        let spi = Spi::new(spi_bus(bus)?, slave_select(ss)?, clock_hz, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        tracing::info!(bus, ss, clock_hz, ?inputs, "mcp3008 ready");
        Ok(Self { spi, inputs })
    }

    fn convert(&mut self, input: u8) -> Result<u16> {
        let tx = mcp3008_request(input)?;
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(mcp3008_decode(&rx))
    }
}

impl SensorSource for Mcp3008 {
    fn read(
        &mut self,
        channel: Channel,
    ) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let input = self.inputs[channel.index()];
        match self.convert(input) {
            Ok(v) => {
                tracing::trace!(channel = channel.name(), input, raw = v, "adc sample");
                Ok(v)
            }
            Err(e) => {
                tracing::error!(channel = channel.name(), input, error = %e, "adc read failed");
                Err(Box::new(e))
            }
        }
    }
}

/// Push button on a GPIO input with the internal pull-up enabled.
pub struct GpioButton {
    pin: InputPin,
    active_low: bool,
}

impl GpioButton {
    pub fn new(pin: u8, active_low: bool) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();
        Ok(Self { pin, active_low })
    }
}

impl ButtonInput for GpioButton {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low() == self.active_low
    }
}
