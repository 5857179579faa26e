//! Frequency calculations
//!
//! RF OUT = f PFD × (INT + FRAC/MOD) / RF Divider
//!
//! Two ways to get there: a closed form for targets that sit on a channel
//! raster, and a search over MOD that minimizes the residual error when they
//! don't.

use core::convert::TryFrom;

use embedded_hal::timer::CountDown;

use crate::{constants::*, decimal::*, errors::*, refin::*, register::*};


/// Time budget unit of the precision search
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Milliseconds(pub u32);

/// A [`CountDown`] that never expires.
///
/// For callers without a timer; a precision search then always runs to
/// completion.
#[derive(Debug,Default,Copy,Clone)]
pub struct NoTimeout;

impl CountDown for NoTimeout {
    type Time = Milliseconds;

    fn start<T>(&mut self, _count: T) where T: Into<Self::Time> {}

    fn wait(&mut self) -> nb::Result<(), void::Void> {
        Err(nb::Error::WouldBlock)
    }
}


/// How INT/FRAC/MOD are derived from the target
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SolveMode {
    /// Closed form, the target must sit on the channel step raster
    ChannelStep,
    /// Search MOD 2..=4095 until the residual error is within
    /// `max_error_hz`. A `timeout_ms` of 0 disables the time budget.
    Precision {
        max_error_hz: u32,
        timeout_ms: u32,
    },
}

/// What to solve for
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct FrequencyPlan {
    /// Target RF frequency, Hz
    pub target: Decimal,
    /// Channel step, Hz
    pub channel_step_hz: u32,
    pub mode: SolveMode,
}

/// Solved divider settings
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllParams {
    /// INT
    pub n: u32,
    /// FRAC, 0 selects integer-N mode
    pub frac: u32,
    /// MOD, always 2 in integer-N mode
    pub modulus: u32,
    /// RF divider is 2^out_div_exp
    pub out_div_exp: u8,
    /// Achieved minus requested frequency, Hz
    pub frequency_error_hz: i32,
}

impl PllParams {

    #[inline]
    pub fn is_fractional(self: &Self) -> bool {
        self.frac != 0
    }

    #[inline]
    pub fn output_divider(self: &Self) -> u32 {
        1 << self.out_div_exp
    }

    /// Hardware range checks, in order: MOD, FRAC, INT, PFD under fractional-N
    pub fn validate(self: &Self, pfd: Decimal) -> Result<(), Error> {
        (if !(MOD_MIN ..= MOD_MAX).contains(&self.modulus) { Err(Error::ModRange) } else { Ok(()) })?;
        (if self.frac >= self.modulus { Err(Error::FracRange) } else { Ok(()) })?;

        if self.is_fractional() {
            (if !(N_FRACN_MIN ..= N_FRACN_MAX).contains(&self.n) { Err(Error::NRangeFrac) } else { Ok(()) })?;
            (if pfd > Decimal::from(PFD_FREQ_FRACN_MAX) { Err(Error::PfdExceededWithFractionalMode) } else { Ok(()) })?;
        } else {
            (if !(N_INTN_MIN ..= N_INTN_MAX).contains(&self.n) { Err(Error::NRange) } else { Ok(()) })?;
        }
        Ok(())
    }
}


/// Output divider exponent for a target frequency.
///
/// Above 23.4375 MHz the divider doubles while it does not exceed
/// floor(3 GHz / target), capped at 128. At and below 23.4375 MHz it is 128.
pub fn output_divider_exponent(target: Decimal) -> u8 {
    if target > Decimal::from(OUT_FREQ_MIN) {
        let ratio = (Decimal::from(VCO_FREQ_HALF_SPAN) / target).trunc();
        let mut div: i128 = 1;
        let mut exp = 0;
        while div <= ratio && div <= 64 {
            div *= 2;
            exp += 1;
        }
        exp
    } else {
        OUT_DIV_EXP_MAX
    }
}

/// Greatest common divisor.
///
/// A zero operand yields the other one, so `gcd(0, 0)` is 0.
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    loop {
        if a == 0 {
            return b;
        }
        if b == 0 || a == b {
            return a;
        }
        if a > b {
            a %= b;
        } else {
            b %= a;
        }
    }
}

/// Reduce FRAC/MOD to lowest terms, then halve both until MOD fits 12 bits.
///
/// Halving loses resolution, the caller sees that as a frequency error.
pub fn reduce(frac: u32, modulus: u32) -> (u32, u32) {
    let (mut frac, mut modulus) = match gcd(frac, modulus) {
        0 => (frac, modulus),
        g => (frac / g, modulus / g),
    };

    if modulus > MOD_MAX {
        while modulus > MOD_MAX {
            modulus /= 2;
            frac /= 2;
        }
        if frac == modulus {
            frac -= 1;
        }
    }
    (frac, modulus)
}

#[inline]
fn saturate_u32(x: i128) -> u32 {
    u32::try_from(x).unwrap_or(if x < 0 { 0 } else { u32::MAX })
}

#[inline]
fn saturate_i32(x: i128) -> i32 {
    i32::try_from(x).unwrap_or(if x < 0 { i32::MIN } else { i32::MAX })
}


impl FrequencyPlan {

    /// Solve INT/FRAC/MOD and the output divider against `refin`.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// PFD nonzero, RF range, channel step consistency (channel step mode
    /// only), then [`PllParams::validate`], then the search time budget.
    pub fn solve<T>(self: &Self, refin: &RefIn, timer: &mut T) -> Result<PllParams, Error>
    where T: CountDown,
          T::Time: From<Milliseconds>,
    {
        let pfd = refin.f_pfd();
        (if pfd.is_zero() { Err(Error::ZeroPfd) } else { Ok(()) })?;

        let target = self.target;
        (if target > Decimal::from(OUT_FREQ_MAX) || target < Decimal::from(OUT_FREQ_MIN) { Err(Error::RfFrequency) } else { Ok(()) })?;

        let step = self.channel_step_hz;
        (if self.mode == SolveMode::ChannelStep && step == 0 { Err(Error::PfdStepRemainder) } else { Ok(()) })?;
        if self.mode == SolveMode::ChannelStep && step > 1 {
            (if (refin.f / refin.r as u32) % step != 0 { Err(Error::PfdStepRemainder) } else { Ok(()) })?;

            // exact remainder: divide, truncate, multiply back
            let steps = target / Decimal::from(step);
            (if !steps.is_integer() { Err(Error::RfFrequencyStepRemainder) } else { Ok(()) })?;
        }

        let out_div_exp = output_divider_exponent(target);
        let outdiv = Decimal::from(1u32 << out_div_exp);

        let (n, frac, modulus, timed_out) = match self.mode {
            SolveMode::ChannelStep => {
                let (n, frac, modulus) = channel_step(target, pfd, outdiv, step);
                (n, frac, modulus, false)
            }
            SolveMode::Precision { max_error_hz, timeout_ms } =>
                precision(target, pfd, outdiv, max_error_hz, timeout_ms, timer),
        };

        // integer-N, MOD is a don't care but must stay in range
        let modulus = if frac == 0 { MOD_MIN } else { modulus };

        let actual = (pfd * Decimal::from(n) + Decimal::from(frac) * (pfd / Decimal::from(modulus))) / outdiv;
        let frequency_error_hz = saturate_i32((actual - target).round_half_up());

        let params = PllParams { n, frac, modulus, out_div_exp, frequency_error_hz };
        debug!(
            "solved N={=u32} FRAC={=u32} MOD={=u32} DIV=2^{=u8} err={=i32}Hz",
            n, frac, modulus, out_div_exp, frequency_error_hz
        );

        params.validate(pfd)?;

        if timed_out {
            warn!("precision search exceeded its time budget");
            return Err(Error::PrecisionTimeout);
        }
        Ok(params)
    }
}


/// Closed form solve on a channel raster: MOD = PFD / step, reduced.
fn channel_step(target: Decimal, pfd: Decimal, outdiv: Decimal, step: u32) -> (u32, u32, u32) {
    let n_exact = target * outdiv / pfd;
    let n = n_exact.trunc();

    let mod_exact = pfd / (Decimal::from(step) / outdiv);
    let frac_scaled = (n_exact - Decimal::from(n)) * mod_exact;

    let outdiv = outdiv.trunc();
    let frac = frac_scaled.round_half_up() / outdiv;
    let modulus = mod_exact.trunc() / outdiv;

    let (frac, modulus) = reduce(saturate_u32(frac), saturate_u32(modulus));
    (saturate_u32(n), frac, modulus)
}

/// MOD search minimizing |remainder - FRAC × PFD / MOD / RF Divider|.
///
/// Returns `(n, frac, modulus, timed_out)`, the best candidate so far when
/// the time budget runs out.
fn precision<T>(
    target: Decimal,
    pfd: Decimal,
    outdiv: Decimal,
    max_error_hz: u32,
    timeout_ms: u32,
    timer: &mut T,
) -> (u32, u32, u32, bool)
where T: CountDown,
      T::Time: From<Milliseconds>,
{
    let n_exact = target / pfd * outdiv;
    let mut n = n_exact.trunc();
    let mut frac = 0;
    let mut modulus = MOD_MIN;
    let mut timed_out = false;

    // a fractional part within 1/4095 of the next integer can't be reached
    // with any FRAC < MOD, round INT up instead
    let bumped = (n_exact + Decimal::ratio(1, MOD_MAX as i128)).trunc();
    if bumped != n {
        n += 1;
        return (saturate_u32(n), frac, modulus, timed_out);
    }

    let remainder = (pfd * Decimal::from(n) / outdiv - target).abs();
    let tolerance = Decimal::from(max_error_hz);
    let mut best = remainder;

    if remainder > tolerance {
        if timeout_ms > 0 {
            timer.start(Milliseconds(timeout_ms));
        }

        for candidate in MOD_MIN ..= MOD_MAX {
            if timeout_ms > 0 {
                match timer.wait() {
                    Ok(()) => {
                        timed_out = true;
                        break;
                    }
                    Err(nb::Error::WouldBlock) => {}
                    Err(nb::Error::Other(e)) => void::unreachable(e),
                }
            }

            let step = pfd / Decimal::from(candidate) / outdiv;
            let mut candidate_frac = saturate_u32((remainder / step).round_half_up());
            if candidate_frac > candidate {
                continue;
            }
            if candidate_frac == candidate {
                candidate_frac -= 1;
            }

            let error = (remainder - Decimal::from(candidate_frac) * step).abs();
            if error < best {
                best = error;
                modulus = candidate;
                frac = candidate_frac;
            }
            if best <= tolerance {
                break;
            }
        }
    }

    (saturate_u32(n), frac, modulus, timed_out)
}


impl RegisterSet {

    /// Output frequency from current register values.
    /// RF OUT = [INT + (FRAC/MOD)] × (f PFD /RF Divider)
    ///
    /// where:
    /// RF OUT is the RF frequency output.
    /// INT is the integer division factor.
    /// FRAC is the numerator of the fractional division (0 to MOD − 1).
    /// MOD is the preset fractional modulus (2 to 4095).
    /// RF Divider is the output divider that divides down the
    /// VCO frequency.
    pub fn f_out(self: &Self, ref_in_hz: u32) -> Result<Decimal, Error> {
        let pfd = RefIn::from_registers(ref_in_hz, self).f_pfd();
        (if pfd.is_zero() { Err(Error::ZeroPfd) } else { Ok(()) })?;

        let int: Int = self.get();
        let frac: Frac = self.get();
        let modulus: Mod = self.get();
        (if modulus.0 == 0 { Err(Error::ModRange) } else { Ok(()) })?;
        let rfdiv: RfDividerSelect = self.get();

        Ok(
            (pfd * Decimal::from(int.0)
                + pfd * Decimal::from(frac.0) / Decimal::from(modulus.0))
                / Decimal::from(1u32 << rfdiv.0)
        )
    }

    /// [`RegisterSet::f_out`] rounded half up at `places` decimals,
    /// the same rule the solver rounds its frequency error with.
    pub fn f_out_fixed(self: &Self, ref_in_hz: u32, places: u32) -> Result<Fixed, Error> {
        Ok(self.f_out(ref_in_hz)?.round_half_up_at(places).fixed(places))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    /// Expires after `left` polls
    struct Ticks {
        left: u32,
        started: Option<u32>,
    }

    impl CountDown for Ticks {
        type Time = Milliseconds;

        fn start<T>(&mut self, count: T) where T: Into<Self::Time> {
            self.started = Some(count.into().0);
        }

        fn wait(&mut self) -> nb::Result<(), void::Void> {
            if self.left == 0 {
                Ok(())
            } else {
                self.left -= 1;
                Err(nb::Error::WouldBlock)
            }
        }
    }

    fn refin(f: u32, r: u16) -> RefIn {
        RefIn { f, r, doubler: false, divider: false }
    }

    fn hz(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn fast(target: &str, step: u32) -> FrequencyPlan {
        FrequencyPlan { target: hz(target), channel_step_hz: step, mode: SolveMode::ChannelStep }
    }

    fn precise(target: &str, max_error_hz: u32, timeout_ms: u32) -> FrequencyPlan {
        FrequencyPlan {
            target: hz(target),
            channel_step_hz: 1,
            mode: SolveMode::Precision { max_error_hz, timeout_ms },
        }
    }

    fn achieved(p: &PllParams, pfd: Decimal) -> Decimal {
        (pfd * Decimal::from(p.n) + pfd * Decimal::from(p.frac) / Decimal::from(p.modulus))
            / Decimal::from(p.output_divider())
    }

    #[test]
    fn output_divider_selection() {
        assert_eq!(output_divider_exponent(hz("23437500")), 7);
        assert_eq!(output_divider_exponent(hz("23437500.000001")), 7);
        assert_eq!(output_divider_exponent(hz("100000000")), 5);
        assert_eq!(output_divider_exponent(hz("1500000000")), 2);
        assert_eq!(output_divider_exponent(hz("2400000000")), 1);
        assert_eq!(output_divider_exponent(hz("3000000000")), 1);
        assert_eq!(output_divider_exponent(hz("3000000001")), 0);
        assert_eq!(output_divider_exponent(hz("6000000000")), 0);
    }

    #[test]
    fn gcd_edge_cases() {
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(9, 9), 9);
        assert_eq!(gcd(100, 2), 2);
        assert_eq!(gcd(1071, 462), 21);
    }

    #[test]
    fn reduce_is_idempotent() {
        for &(f, m) in &[(1, 50), (3, 4), (0, 2), (2047, 4095), (7, 4000)] {
            let once = reduce(f, m);
            assert_eq!(reduce(once.0, once.1), once);
        }
        assert_eq!(reduce(2, 100), (1, 50));
        assert_eq!(reduce(0, 100), (0, 1));
    }

    #[test]
    fn reduce_halving_always_lands_in_range() {
        for modulus in (4096..200_000).step_by(97) {
            for &frac in &[1, modulus / 3, modulus / 2 + 1, modulus - 1] {
                let (f, m) = reduce(frac, modulus);
                assert!(m >= MOD_MIN && m <= MOD_MAX, "{}/{} -> {}/{}", frac, modulus, f, m);
                assert!(f < m, "{}/{} -> {}/{}", frac, modulus, f, m);
            }
        }
    }

    #[test]
    fn channel_step_integer_n() {
        let p = fast("2400000000", 100_000).solve(&refin(10_000_000, 1), &mut NoTimeout).unwrap();
        assert_eq!(p, PllParams { n: 480, frac: 0, modulus: 2, out_div_exp: 1, frequency_error_hz: 0 });
        assert!(!p.is_fractional());
    }

    #[test]
    fn channel_step_fractional_n() {
        let p = fast("2400100000", 100_000).solve(&refin(10_000_000, 1), &mut NoTimeout).unwrap();
        assert_eq!(p, PllParams { n: 480, frac: 1, modulus: 50, out_div_exp: 1, frequency_error_hz: 0 });
    }

    #[test]
    fn channel_step_sweep_is_exact_and_coprime() {
        let r = refin(10_000_000, 1);
        let pfd = r.f_pfd();
        for &step in &[2_500, 10_000, 25_000, 100_000, 200_000, 1_000_000] {
            let mut f: u64 = 23_437_500 + step as u64;
            while f <= 6_000_000_000 {
                let target = f - f % step as u64;
                let p = FrequencyPlan {
                    target: Decimal::from(target),
                    channel_step_hz: step,
                    mode: SolveMode::ChannelStep,
                }
                .solve(&r, &mut NoTimeout)
                .unwrap();

                assert!(p.frac < p.modulus && p.modulus <= MOD_MAX);
                if p.is_fractional() {
                    assert_eq!(gcd(p.frac, p.modulus), 1);
                }
                assert_eq!(p.frequency_error_hz, 0, "{} Hz step {}", target, step);
                assert_eq!(achieved(&p, pfd), Decimal::from(target));
                f += 47_123_457;
            }
        }
    }

    #[test]
    fn channel_step_fine_raster_halves_modulus() {
        // PFD / step = 10000 > 4095, resolution is traded for range
        let p = fast("2400001000", 1_000).solve(&refin(10_000_000, 1), &mut NoTimeout).unwrap();
        assert!(p.modulus <= MOD_MAX && p.frac < p.modulus);
        assert_ne!(p.frequency_error_hz, 0);
    }

    #[test]
    fn channel_step_consistency() {
        // 10 MHz / 3 is not a multiple of 100 kHz
        assert_eq!(
            fast("2400000000", 100_000).solve(&refin(10_000_000, 3), &mut NoTimeout),
            Err(Error::PfdStepRemainder)
        );
        assert_eq!(
            fast("2400050000", 100_000).solve(&refin(10_000_000, 1), &mut NoTimeout),
            Err(Error::RfFrequencyStepRemainder)
        );
        assert_eq!(
            fast("2400000000.5", 100_000).solve(&refin(10_000_000, 1), &mut NoTimeout),
            Err(Error::RfFrequencyStepRemainder)
        );
        assert_eq!(
            fast("2400000000", 0).solve(&refin(10_000_000, 1), &mut NoTimeout),
            Err(Error::PfdStepRemainder)
        );
        // precision mode does not care about the raster
        assert!(precise("2400050000", 0, 0).solve(&refin(10_000_000, 3), &mut NoTimeout).is_ok());
    }

    #[test]
    fn rf_range_boundaries() {
        let r = refin(10_000_000, 1);
        let p = fast("23437500", 12_500).solve(&r, &mut NoTimeout).unwrap();
        assert_eq!(p.out_div_exp, 7);
        assert!(fast("6000000000", 100_000).solve(&r, &mut NoTimeout).is_ok());
        assert_eq!(fast("6000000001", 1).solve(&r, &mut NoTimeout), Err(Error::RfFrequency));
        assert_eq!(fast("23437499.999", 1).solve(&r, &mut NoTimeout), Err(Error::RfFrequency));
    }

    #[test]
    fn zero_pfd_is_rejected_first() {
        assert_eq!(fast("9000000000", 100_000).solve(&refin(10_000_000, 0), &mut NoTimeout), Err(Error::ZeroPfd));
    }

    #[test]
    fn precision_exact_fraction() {
        let p = precise("4007500000", 0, 1000)
            .solve(&refin(10_000_000, 1), &mut Ticks { left: 10_000, started: None })
            .unwrap();
        assert_eq!(p, PllParams { n: 400, frac: 3, modulus: 4, out_div_exp: 0, frequency_error_hz: 0 });
    }

    #[test]
    fn precision_within_tolerance_stays_integer() {
        let p = precise("4000000400", 500, 0).solve(&refin(10_000_000, 1), &mut NoTimeout).unwrap();
        assert_eq!((p.n, p.frac, p.modulus), (400, 0, 2));
        // -400 Hz, biased by +0.5 and truncated toward zero
        assert_eq!(p.frequency_error_hz, -399);
    }

    #[test]
    fn precision_rounds_int_up_near_next_integer() {
        // N exact = 400.9999999
        let p = precise("4009999999", 0, 0).solve(&refin(10_000_000, 1), &mut NoTimeout).unwrap();
        assert_eq!((p.n, p.frac, p.modulus), (401, 0, 2));
        assert_eq!(p.frequency_error_hz, 1);
    }

    #[test]
    fn precision_finds_the_true_minimum() {
        let r = refin(10_000_000, 1);
        let pfd = r.f_pfd();
        let target = hz("4001234567.25");
        let p = FrequencyPlan {
            target,
            channel_step_hz: 1,
            mode: SolveMode::Precision { max_error_hz: 0, timeout_ms: 0 },
        }
        .solve(&r, &mut NoTimeout)
        .unwrap();

        let outdiv = Decimal::from(p.output_divider());
        let remainder = target - pfd * Decimal::from(p.n) / outdiv;
        let mut min = remainder;
        for m in MOD_MIN ..= MOD_MAX {
            let step = pfd / Decimal::from(m) / outdiv;
            // nearest FRAC below MOD is one of the two neighbours
            let below = (remainder / step).trunc() as u32;
            for f in [below, below + 1].iter().filter(|&&f| f < m) {
                let e = (remainder - Decimal::from(*f) * step).abs();
                if e < min {
                    min = e;
                }
            }
        }

        let residual = (achieved(&p, pfd) - target).abs();
        assert_eq!(residual, min);
        assert!(residual <= pfd / Decimal::from(MOD_MAX) / outdiv);
    }

    #[test]
    fn precision_timeout() {
        let r = refin(10_000_000, 1);

        // MOD 2 and 3 fit in the budget, MOD 4 does not
        let mut ticks = Ticks { left: 2, started: None };
        assert_eq!(precise("4007500000", 0, 25).solve(&r, &mut ticks), Err(Error::PrecisionTimeout));
        assert_eq!(ticks.started, Some(25));

        let mut ticks = Ticks { left: 3, started: None };
        let p = precise("4007500000", 0, 25).solve(&r, &mut ticks).unwrap();
        assert_eq!((p.n, p.frac, p.modulus), (400, 3, 4));
    }

    #[test]
    fn precision_without_budget_never_polls() {
        let mut ticks = Ticks { left: 0, started: None };
        let p = precise("4007500000", 0, 0).solve(&refin(10_000_000, 1), &mut ticks).unwrap();
        assert_eq!((p.n, p.frac, p.modulus), (400, 3, 4));
        assert_eq!(ticks.started, None);
    }

    #[test]
    fn range_checks() {
        // 200 MHz PFD, N = 15
        assert_eq!(fast("3000000001", 1).solve(&refin(200_000_000, 1), &mut NoTimeout), Err(Error::NRange));
        // 10 kHz PFD, N = 400750
        assert_eq!(fast("4007500000", 10_000).solve(&refin(10_000_000, 1000), &mut NoTimeout), Err(Error::NRange));
        // 1 MHz PFD, N = 5000 with FRAC 1/2
        assert_eq!(fast("5000500000", 500_000).solve(&refin(10_000_000, 10), &mut NoTimeout), Err(Error::NRangeFrac));
        // fractional-N above 50 MHz PFD
        assert_eq!(
            precise("4007500000", 0, 0).solve(&refin(60_000_000, 1), &mut NoTimeout),
            Err(Error::PfdExceededWithFractionalMode)
        );
        // integer-N is fine at 60 MHz
        assert!(precise("3960000000", 0, 0).solve(&refin(60_000_000, 1), &mut NoTimeout).is_ok());
    }

    #[test]
    fn validate_order() {
        let p = PllParams { n: 1, frac: 5, modulus: 1, out_div_exp: 0, frequency_error_hz: 0 };
        assert_eq!(p.validate(Decimal::from(10_000_000u32)), Err(Error::ModRange));
        let p = PllParams { modulus: 5, ..p };
        assert_eq!(p.validate(Decimal::from(10_000_000u32)), Err(Error::FracRange));
        let p = PllParams { frac: 4, ..p };
        assert_eq!(p.validate(Decimal::from(10_000_000u32)), Err(Error::NRangeFrac));
        let p = PllParams { n: 100, ..p };
        assert_eq!(p.validate(Decimal::from(60_000_000u32)), Err(Error::PfdExceededWithFractionalMode));
        assert_eq!(p.validate(Decimal::from(50_000_000u32)), Ok(()));
    }

    #[test]
    fn readback_round_trip() {
        let r = refin(10_000_000, 1);
        for &(target, step) in &[
            ("23437500", 12_500u32),
            ("145625000", 12_500),
            ("2400100000", 100_000),
            ("4007500000", 2_500_000),
            ("5999900000", 100_000),
            ("6000000000", 1),
        ] {
            let p = fast(target, step).solve(&r, &mut NoTimeout).unwrap();
            let rs = RegisterSet::default()
                .set(Int(p.n as u16))
                .set(Frac(p.frac as u16))
                .set(Mod(p.modulus as u16))
                .set(RfDividerSelect(p.out_div_exp));
            assert_eq!(rs.f_out(10_000_000).unwrap(), hz(target));
            let expect = std::format!("{}.000000", target);
            assert_eq!(rs.f_out_fixed(10_000_000, READOUT_DECIMAL_PLACES).unwrap().to_string(), expect);
        }
    }

    #[test]
    fn readback_rounds_half_up() {
        // 10 MHz / 3 PFD: 3333333.333... * 1200 / 1 + 1/3 of a step
        let rs = RegisterSet::default()
            .set(R(3))
            .set(Int(1200))
            .set(Frac(1))
            .set(Mod(3))
            .set(RfDividerSelect(0));
        // 4000000000 + 1111111.111111... = 4001111111.111111
        assert_eq!(rs.f_out_fixed(10_000_000, 6).unwrap().to_string(), "4001111111.111111");

        let rs = rs.set(Frac(2));
        // 4002222222.2222222 -> .222222
        assert_eq!(rs.f_out_fixed(10_000_000, 6).unwrap().to_string(), "4002222222.222222");

        let rs = rs.set(R(6)).set(Frac(1)).set(Mod(2)).set(Int(1));
        // 10 MHz / 6 * 1.5 = 2500000 exactly
        assert_eq!(rs.f_out_fixed(10_000_000, 0).unwrap().to_string(), "2500000");
    }

    #[test]
    fn readback_guards_division() {
        let rs = RegisterSet::default().set(R(0));
        assert_eq!(rs.f_out(10_000_000), Err(Error::ZeroPfd));
        let rs = RegisterSet::default().set(Mod(0));
        assert_eq!(rs.f_out(10_000_000), Err(Error::ModRange));
    }
}
