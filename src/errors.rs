//! Errors

/// Driver errors.
///
/// Every failure leaves the register image untouched.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI write failed
    Spi,
    /// GPIO pin could not be driven
    Pin,

    /// Channel step is larger than the PFD frequency
    StepExceedsPfd,
    /// PFD (or REFin / R) is not a whole multiple of the channel step
    PfdStepRemainder,
    /// Target RF frequency outside of 23.4375 MHz .. 6 GHz
    RfFrequency,
    /// Target RF frequency is not a whole multiple of the channel step
    RfFrequencyStepRemainder,
    /// RF output power level outside of 0..=4
    PowerLevel,
    /// Aux output power level outside of 0..=4
    AuxPowerLevel,
    /// R counter is 0, PFD is undefined
    ZeroPfd,
    /// MOD outside of 2..=4095
    ModRange,
    /// FRAC is not below MOD
    FracRange,
    /// INT outside of 16..=65535 (integer-N)
    NRange,
    /// INT outside of 19..=4091 (fractional-N)
    NRangeFrac,
    /// Fractional-N needs PFD <= 50 MHz
    PfdExceededWithFractionalMode,
    /// Precision search ran out of its time budget
    PrecisionTimeout,

    /// Doubler requested with REFin above 30 MHz
    DoublerExceeded,
    /// R counter outside of 1..=1023
    RRange,
    /// REFin outside of 10 MHz .. 200 MHz
    ReferenceFrequency,
    /// PFD outside of 125 kHz .. 105 MHz
    PfdLimits,

    /// Output divider is not a power of two in 1..=128
    OutputDivider,
    /// Frequency string is not a non-negative fixed-point decimal
    MalformedFrequency,
}
