///! Input reference config
///! RefIn / Doubler / R counter / Divider

use crate::{ constants::*, decimal::*, errors::*, register::* };


/// Reference path multiplier, as stored in R2[25:24]
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReferenceDivision {
    /// REFin / R
    Undivided,
    /// REFin / (2 * R)
    Half,
    /// 2 * REFin / R
    Double,
}


/// Input reference frequency config
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct RefIn {
    /// Input frequency
    pub f: u32,
    /// R counter value
    pub r: u16,
    /// True if 2X doubler is enabled
    pub doubler: bool,
    /// True if 2X divider is enabled
    pub divider: bool,
}

impl RefIn {

    /// Configure reference input frequency.
    ///
    /// Rejects out of range inputs and any combination whose PFD falls
    /// outside of 125 kHz .. 105 MHz.
    pub fn new(
        f: u32,
        r: u16,
        division: ReferenceDivision,
    ) -> Result<Self, Error> {
        (if f > REF_IN_DOUBLER_MAX && division == ReferenceDivision::Double { Err(Error::DoublerExceeded) } else { Ok(()) })?;
        (if !(R_MIN ..= R_MAX).contains(&r) { Err(Error::RRange) } else { Ok(()) })?;
        (if !(REF_IN_FREQ_MIN ..= REF_IN_FREQ_MAX).contains(&f) { Err(Error::ReferenceFrequency) } else { Ok(()) })?;

        let res = RefIn {
            f,
            r,
            doubler: division == ReferenceDivision::Double,
            divider: division == ReferenceDivision::Half,
        };

        let pfd = res.f_pfd();
        if pfd > Decimal::from(PFD_FREQ_INTN_MAX) || pfd < Decimal::from(PFD_FREQ_MIN) {
            Err(Error::PfdLimits)
        } else {
            Ok(res)
        }
    }

    /// Reference config as currently programmed, no range checks.
    pub fn from_registers(f: u32, rs: &RegisterSet) -> Self {
        let r: R = rs.get();
        let doubler: RefDoubler = rs.get();
        let divider: Rdiv2 = rs.get();
        RefIn {
            f,
            r: r.0,
            doubler: doubler == RefDoubler::Enabled,
            divider: divider == Rdiv2::Enabled,
        }
    }

    /// Phase Frequency Detector' frequency
    /// f PFD = REF IN × [(1 + D)/(R × (1 + T))]
    /// where:
    /// REF IN is the reference frequency input.
    /// D is the RF REF IN doubler bit (0 or 1).
    /// R is the RF reference division factor (1 to 1023).
    /// T is the reference divide-by-2 bit (0 or 1).
    ///
    /// Zero when R is 0, callers must treat that as an undefined PFD.
    pub fn f_pfd(self: &Self) -> Decimal {
        if self.r == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.f)
            / Decimal::from(1 + self.divider as u32)
            * Decimal::from(1 + self.doubler as u32)
            / Decimal::from(self.r)
    }

    /// Write R, doubler and divide-by-2 into the register set
    pub fn apply(self: &Self, rs: RegisterSet) -> RegisterSet {
        rs.set(R(self.r))
          .set(if self.doubler { RefDoubler::Enabled } else { RefDoubler::Disabled })
          .set(if self.divider { Rdiv2::Enabled } else { Rdiv2::Disabled })
    }
}
