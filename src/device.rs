//! Device pins

use embedded_hal:: {
    digital::v2::OutputPin,
    blocking::{ delay::*, spi::*, },
    timer::CountDown,
};


use crate::{config::*, errors::*, frequency::*, refin::*, register::*};

/// MAX2870 device
pub struct Max2870<CE, LE, SPI> {
    spi: SPI,
    pin_ce: CE,
    pin_le: LE,
    synth: Synthesizer,
}


impl<CE, LE, SPI,> Max2870<CE, LE, SPI,>
where CE: OutputPin,
      LE: OutputPin,
      SPI: Write<u8>,
{
    /// Creates the device, nothing is written until the first
    /// configuration call.
    ///
    /// `spi` - SPI device (`MOSI` => `DATA`, `CLK` => `CLK`, mode 0, MSB first)
    /// `pin_ce` - "chip enable" pin
    /// `pin_le` - "load enable" pin, idles high
    ///
    pub fn new(
        spi: SPI,
        pin_ce: CE,
        pin_le: LE,
    ) -> Self {
        Max2870 { spi, pin_ce, pin_le, synth: Synthesizer::new() }
    }

    /// Gives the bus and pins back
    pub fn release(self) -> (SPI, CE, LE) {
        (self.spi, self.pin_ce, self.pin_le)
    }

    /// Configuration state, for readback
    #[inline]
    pub fn synthesizer(self: &Self) -> &Synthesizer {
        &self.synth
    }

    /// See [`Synthesizer::set_reference`]. Takes effect with the next write.
    pub fn set_reference(
        self: &mut Self,
        ref_in_hz: u32,
        r: u16,
        division: ReferenceDivision,
    ) -> Result<(), Error> {
        self.synth.set_reference(ref_in_hz, r, division)
    }

    /// See [`Synthesizer::set_channel_step`]. Takes effect with the next
    /// [`Max2870::set_frequency`].
    pub fn set_channel_step(self: &mut Self, step_hz: u32) -> Result<(), Error> {
        self.synth.set_channel_step(step_hz)
    }

    /// Solves for `target` and writes the registers out, also when the
    /// result is [`Outcome::OffTarget`]. Nothing is written on error.
    pub fn set_frequency<Delay, T>(
        self: &mut Self,
        delay: &mut Delay,
        target: &str,
        output: &OutputConfig,
        mode: SolveMode,
        timer: &mut T,
    ) -> Result<Outcome, Error>
    where Delay: DelayUs<u16>,
          T: CountDown,
          T::Time: From<Milliseconds>,
    {
        let outcome = self.synth.set_frequency(target, output, mode, timer)?;
        self.write_registers(delay)?;
        Ok(outcome)
    }

    pub fn set_power_level<Delay>(self: &mut Self, delay: &mut Delay, level: u8) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        self.synth.set_power_level(level)?;
        self.write_registers(delay)
    }

    pub fn set_aux_power_level<Delay>(self: &mut Self, delay: &mut Delay, level: u8) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        self.synth.set_aux_power_level(level)?;
        self.write_registers(delay)
    }

    /// Replays a register image captured with
    /// [`Max2870::export_register_image`], R0 first.
    pub fn load_register_image<Delay>(self: &mut Self, delay: &mut Delay, words: [u32; 6]) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        self.synth.load_register_image(words);
        self.write_registers(delay)
    }

    pub fn export_register_image(self: &Self) -> [u32; 6] {
        self.synth.export_register_image()
    }

    /// See [`Synthesizer::set_pll_direct`]
    #[allow(clippy::too_many_arguments)]
    pub fn set_pll_direct<Delay>(
        self: &mut Self,
        delay: &mut Delay,
        r: u16,
        n: u16,
        modulus: u16,
        frac: u16,
        out_div: u8,
        fractional: bool,
    ) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        self.synth.set_pll_direct(r, n, modulus, frac, out_div, fractional)?;
        self.write_registers(delay)
    }

    pub fn set_charge_pump_current<Delay>(self: &mut Self, delay: &mut Delay, current_ua: u16) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        self.synth.set_charge_pump_current(current_ua);
        self.write_registers(delay)
    }

    pub fn set_phase_detector_polarity<Delay>(
        self: &mut Self,
        delay: &mut Delay,
        polarity: PhaseDetectorPolarity,
    ) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        self.synth.set_phase_detector_polarity(polarity);
        self.write_registers(delay)
    }

    /// Writes all control registers out, R5 first.
    /// Blocking call.
    pub fn write_registers<Delay>(
        self: &mut Self,
        delay: &mut Delay,
    ) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        let words = self.synth.export_register_image();
        debug!("writing registers {:#x}", words);
        for w in words.iter().rev() {
            self.write_register(delay, *w)?;
        }
        Ok(())
    }

    /// Data is clocked into the 32-bit shift register, MSB first, while LE
    /// is low. The rising edge of LE latches it into the register selected
    /// by the three address bits.
    ///
    /// Blocking implementation.
    #[inline(always)]
    pub fn write_register<Delay>(self: &mut Self, delay: &mut Delay, w: u32) -> Result<(), Error>
    where Delay: DelayUs<u16>,
    {
        let data = w.to_be_bytes();

        self.load_disable()?;
        delay.delay_us(1);
        self.spi.write(&data).map_err(|_| Error::Spi)?;
        delay.delay_us(1);
        self.load_enable()?;
        delay.delay_us(1);

        Ok(())
    }

    /// Powers up the device, depending on the status of the shutdown bit.
    #[inline(always)]
    pub fn enable(self: &mut Self) -> Result<(), Error> {
        self.pin_ce.set_high().map_err(|_| Error::Pin)
    }

    /// Powers down the device and puts the charge pump into three-state mode.
    #[inline(always)]
    pub fn disable(self: &mut Self) -> Result<(), Error> {
        self.pin_ce.set_low().map_err(|_| Error::Pin)
    }

    /// When LE goes high, the data stored in the 32-bit shift register is
    /// loaded into the register that is selected by the three control bits.
    #[inline(always)]
    fn load_enable(self: &mut Self) -> Result<(), Error> {
        self.pin_le.set_high().map_err(|_| Error::Pin)
    }

    /// Start shifting in a new word
    #[inline(always)]
    fn load_disable(self: &mut Self) -> Result<(), Error> {
        self.pin_le.set_low().map_err(|_| Error::Pin)
    }
}
