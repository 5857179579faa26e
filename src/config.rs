//! Device configuration
//!
//! [`Synthesizer`] owns the register image and the few values that are not
//! stored in it (REFin, channel step, last residual error). Every operation
//! either commits a complete new image or leaves the old one untouched.

use embedded_hal::timer::CountDown;

use crate::{constants::*, decimal::*, errors::*, frequency::*, refin::*, register::*};


/// Result of a successful [`Synthesizer::set_frequency`]
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Output is on target (channel step) or within tolerance (precision)
    Tuned,
    /// Registers were updated with the closest achievable setting,
    /// `error_hz` is achieved minus requested frequency.
    OffTarget { error_hz: i32 },
}


/// RF and aux output settings applied together with a new frequency
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct OutputConfig {
    /// 0 turns RFOUTA off, 1..=4 select -4, -1, +2, +5 dBm
    pub power_level: u8,
    /// 0 turns RFOUTB off, 1..=4 select -4, -1, +2, +5 dBm
    pub aux_power_level: u8,
    /// RFOUTB source, only written when RFOUTB is on
    pub aux_divider: AuxOutputSelect,
}

impl Default for OutputConfig {
    /// Matches the power-on image: RFOUTA at +5 dBm, RFOUTB off
    fn default() -> Self {
        OutputConfig {
            power_level: POWER_LEVEL_MAX,
            aux_power_level: 0,
            aux_divider: AuxOutputSelect::Fundamental,
        }
    }
}

impl OutputConfig {

    pub fn validate(self: &Self) -> Result<(), Error> {
        (if self.power_level > POWER_LEVEL_MAX { Err(Error::PowerLevel) } else { Ok(()) })?;
        (if self.aux_power_level > POWER_LEVEL_MAX { Err(Error::AuxPowerLevel) } else { Ok(()) })?;
        Ok(())
    }

    pub fn apply(self: &Self, rs: RegisterSet) -> RegisterSet {
        let rs = rf_power(rs, self.power_level);
        aux_power(rs, self.aux_power_level, Some(self.aux_divider))
    }
}

fn rf_power(rs: RegisterSet, level: u8) -> RegisterSet {
    match level {
        0 => rs.set(RfOutputEnable::Disabled),
        l => rs.set(RfOutputEnable::Enabled).set(OutputPower(l - 1)),
    }
}

fn aux_power(rs: RegisterSet, level: u8, divider: Option<AuxOutputSelect>) -> RegisterSet {
    match level {
        0 => rs.set(AuxOutputEnable::Disabled),
        l => {
            let rs = rs.set(AuxOutputPower(l - 1)).set(AuxOutputEnable::Enabled);
            match divider {
                Some(d) => rs.set(d),
                None => rs,
            }
        }
    }
}


/// Integer-N / fractional-N flag group: INT mode, charge pump linearity and
/// clamp, lock detect function, F01.
pub fn apply_mode(rs: RegisterSet, fractional: bool) -> RegisterSet {
    if fractional {
        rs.set(IntMode::FracN)
          .set(ChargePumpLinearity::Cpl10)
          .set(ChargePumpClamp::Disabled)
          .set(Ldf::FracN)
          .set(F01::FracN)
    } else {
        rs.set(IntMode::IntN)
          .set(ChargePumpLinearity::Disabled)
          .set(ChargePumpClamp::Enabled)
          .set(Ldf::IntN)
          .set(F01::IntN)
    }
}

impl PllParams {

    /// Encode solved dividers into the register set.
    /// Only meaningful for validated parameters.
    pub fn apply(self: &Self, pfd: Decimal, rs: RegisterSet) -> RegisterSet {
        let lds =
            if pfd > Decimal::from(PFD_FREQ_LDS_THRESHOLD) {
                LockDetectSpeed::Fast
            } else {
                LockDetectSpeed::Slow
            };

        let rs = rs.set(Frac(self.frac as u16))
                   .set(Int(self.n as u16));

        apply_mode(rs, self.is_fractional())
            .set(Mod(self.modulus as u16))
            .set(lds)
            .set(RfDividerSelect(self.out_div_exp))
    }
}


/// Synthesizer state: register image plus the reference frequency and
/// channel step it was planned with.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Synthesizer {
    rs: RegisterSet,
    ref_in_hz: u32,
    channel_step_hz: u32,
    frequency_error_hz: i32,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Synthesizer {
            rs: RegisterSet::default(),
            ref_in_hz: REF_IN_FREQ_DEFAULT,
            channel_step_hz: CHANNEL_STEP_DEFAULT,
            frequency_error_hz: 0,
        }
    }
}

impl Synthesizer {

    /// Power-on state: 10 MHz REFin, 100 kHz channel step
    pub fn new() -> Self {
        Synthesizer::default()
    }

    #[inline]
    pub fn registers(self: &Self) -> &RegisterSet {
        &self.rs
    }

    /// Reference path as currently programmed
    #[inline]
    pub fn refin(self: &Self) -> RefIn {
        RefIn::from_registers(self.ref_in_hz, &self.rs)
    }

    /// Set REFin, the R counter and the doubler / divide-by-2 selection.
    /// Nothing changes unless the resulting PFD is within limits.
    pub fn set_reference(
        self: &mut Self,
        ref_in_hz: u32,
        r: u16,
        division: ReferenceDivision,
    ) -> Result<(), Error> {
        let refin = RefIn::new(ref_in_hz, r, division)?;
        self.ref_in_hz = ref_in_hz;
        self.rs = refin.apply(self.rs);
        Ok(())
    }

    /// Channel raster used by [`SolveMode::ChannelStep`].
    /// The PFD must be a whole multiple of it.
    pub fn set_channel_step(self: &mut Self, step_hz: u32) -> Result<(), Error> {
        let pfd = self.pfd();
        (if Decimal::from(step_hz) > pfd { Err(Error::StepExceedsPfd) } else { Ok(()) })?;
        (if step_hz == 0 || !(pfd / Decimal::from(step_hz)).is_integer() { Err(Error::PfdStepRemainder) } else { Ok(()) })?;
        self.channel_step_hz = step_hz;
        Ok(())
    }

    /// Solve for `target` (Hz, fixed-point decimal string) and commit the
    /// new register image together with `output`.
    ///
    /// `timer` bounds a [`SolveMode::Precision`] search with a non-zero
    /// `timeout_ms`, [`NoTimeout`] will do otherwise.
    pub fn set_frequency<T>(
        self: &mut Self,
        target: &str,
        output: &OutputConfig,
        mode: SolveMode,
        timer: &mut T,
    ) -> Result<Outcome, Error>
    where T: CountDown,
          T::Time: From<Milliseconds>,
    {
        output.validate()?;

        let refin = self.refin();
        let pfd = refin.f_pfd();
        (if pfd.is_zero() { Err(Error::ZeroPfd) } else { Ok(()) })?;

        let target: Decimal = target.parse()?;
        let plan = FrequencyPlan { target, channel_step_hz: self.channel_step_hz, mode };
        let params = plan.solve(&refin, timer)?;

        self.rs = output.apply(params.apply(pfd, self.rs));
        self.frequency_error_hz = params.frequency_error_hz;

        let error_hz = params.frequency_error_hz;
        let off_target = match mode {
            SolveMode::ChannelStep => error_hz != 0,
            SolveMode::Precision { max_error_hz, .. } => error_hz.unsigned_abs() > max_error_hz,
        };

        if off_target {
            warn!("frequency error {=i32} Hz", error_hz);
            Ok(Outcome::OffTarget { error_hz })
        } else {
            Ok(Outcome::Tuned)
        }
    }

    /// RFOUTA power level, 0 is off
    pub fn set_power_level(self: &mut Self, level: u8) -> Result<(), Error> {
        (if level > POWER_LEVEL_MAX { Err(Error::PowerLevel) } else { Ok(()) })?;
        self.rs = rf_power(self.rs, level);
        Ok(())
    }

    /// RFOUTB power level, 0 is off. The aux source select is kept.
    pub fn set_aux_power_level(self: &mut Self, level: u8) -> Result<(), Error> {
        (if level > POWER_LEVEL_MAX { Err(Error::AuxPowerLevel) } else { Ok(()) })?;
        self.rs = aux_power(self.rs, level, None);
        Ok(())
    }

    /// Replace the register image, R0 first. Used to replay a
    /// precomputed sweep without solving again.
    pub fn load_register_image(self: &mut Self, words: [u32; 6]) {
        self.rs = RegisterSet::from_words(words);
    }

    /// Current register image, R0 first
    pub fn export_register_image(self: &Self) -> [u32; 6] {
        self.rs.to_words()
    }

    /// Program R, INT, MOD, FRAC and the output divider (1, 2, 4 .. 128)
    /// without solving. Values are written as given, masked to their field
    /// widths.
    pub fn set_pll_direct(
        self: &mut Self,
        r: u16,
        n: u16,
        modulus: u16,
        frac: u16,
        out_div: u8,
        fractional: bool,
    ) -> Result<(), Error> {
        (if !out_div.is_power_of_two() { Err(Error::OutputDivider) } else { Ok(()) })?;
        let out_div_exp = out_div.trailing_zeros() as u8;

        let rs = self.rs
            .set(R(r))
            .set(Int(n))
            .set(Mod(modulus))
            .set(Frac(frac))
            .set(RfDividerSelect(out_div_exp));
        self.rs = apply_mode(rs, fractional);
        Ok(())
    }

    /// Charge pump current in uA, clamped to 320 ..= 5120 and rounded
    /// down to the 320 uA grid.
    pub fn set_charge_pump_current(self: &mut Self, current_ua: u16) {
        let ua = current_ua.max(CP_CURRENT_MIN_UA).min(CP_CURRENT_MAX_UA) as u32;
        // I / 320 uA - 1/2, truncated
        let code = (2 * ua - CP_CURRENT_MIN_UA as u32) / (2 * CP_CURRENT_MIN_UA as u32);
        self.rs = self.rs.set(ChargePumpCurrent(code as u8));
    }

    pub fn set_phase_detector_polarity(self: &mut Self, polarity: PhaseDetectorPolarity) {
        self.rs = self.rs.set(polarity);
    }


    #[inline]
    pub fn reference_frequency(self: &Self) -> u32 {
        self.ref_in_hz
    }

    #[inline]
    pub fn channel_step(self: &Self) -> u32 {
        self.channel_step_hz
    }

    pub fn r(self: &Self) -> u16 {
        self.rs.get::<R, _>().0
    }

    pub fn n(self: &Self) -> u16 {
        self.rs.get::<Int, _>().0
    }

    pub fn frac(self: &Self) -> u16 {
        self.rs.get::<Frac, _>().0
    }

    pub fn modulus(self: &Self) -> u16 {
        self.rs.get::<Mod, _>().0
    }

    /// RF divider, 1 ..= 128
    pub fn output_divider(self: &Self) -> u8 {
        1 << self.output_divider_exponent()
    }

    pub fn output_divider_exponent(self: &Self) -> u8 {
        self.rs.get::<RfDividerSelect, _>().0
    }

    pub fn ref_div2(self: &Self) -> bool {
        self.rs.get::<Rdiv2, _>() == Rdiv2::Enabled
    }

    pub fn ref_doubler(self: &Self) -> bool {
        self.rs.get::<RefDoubler, _>() == RefDoubler::Enabled
    }

    /// PFD frequency, 0 when R is 0
    pub fn pfd(self: &Self) -> Decimal {
        self.refin().f_pfd()
    }

    /// Residual error of the last committed solve, Hz
    #[inline]
    pub fn frequency_error(self: &Self) -> i32 {
        self.frequency_error_hz
    }

    /// Output frequency decoded from the register image, Hz with 6 decimals
    pub fn current_frequency(self: &Self) -> Result<Fixed, Error> {
        self.rs.f_out_fixed(self.ref_in_hz, READOUT_DECIMAL_PLACES)
    }
}
