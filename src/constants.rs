//! Constants

/// Minimum allowed REFin frequency
pub const REF_IN_FREQ_MIN: u32 = 10_000_000;

/// Maximum allowed REFin frequency
pub const REF_IN_FREQ_MAX: u32 = 200_000_000;

/// The reference doubler only accepts REFin up to 30 MHz
pub const REF_IN_DOUBLER_MAX: u32 = 30_000_000;

/// REFin assumed at power up
pub const REF_IN_FREQ_DEFAULT: u32 = 10_000_000;

/// Min Phase Detector Frequency
pub const PFD_FREQ_MIN: u32 = 125_000;

/// Max Phase Detector Frequency (Integer-N)
pub const PFD_FREQ_INTN_MAX: u32 = 105_000_000;

/// Max Phase Detector Frequency (Fractional-N)
pub const PFD_FREQ_FRACN_MAX: u32 = 50_000_000;

/// Above this PFD the lock detect speed bit must be set
pub const PFD_FREQ_LDS_THRESHOLD: u32 = 32_000_000;

/// R counter range
pub const R_MIN: u16 = 1;
pub const R_MAX: u16 = 1023;

/// INT range, integer-N mode
pub const N_INTN_MIN: u32 = 16;
pub const N_INTN_MAX: u32 = 65_535;

/// INT range, fractional-N mode
pub const N_FRACN_MIN: u32 = 19;
pub const N_FRACN_MAX: u32 = 4091;

/// Fractional modulus range
pub const MOD_MIN: u32 = 2;
pub const MOD_MAX: u32 = 4095;

/// Minimum output frequency, VCO at 3 GHz divided by 128
pub const OUT_FREQ_MIN: u64 = 23_437_500;

/// Maximum output frequency, undivided VCO
pub const OUT_FREQ_MAX: u64 = 6_000_000_000;

/// Output divider is picked so that divider * RFout stays above this.
pub const VCO_FREQ_HALF_SPAN: u64 = 3_000_000_000;

/// Largest RF output divider exponent (divide by 128)
pub const OUT_DIV_EXP_MAX: u8 = 7;

/// Output power levels: 0 is off, 1..=4 map to the 2-bit power field
pub const POWER_LEVEL_MAX: u8 = 4;

/// Channel step assumed at power up
pub const CHANNEL_STEP_DEFAULT: u32 = 100_000;

/// Charge pump current limits, uA
pub const CP_CURRENT_MIN_UA: u16 = 320;
pub const CP_CURRENT_MAX_UA: u16 = 5120;

/// Decimal places of the frequency readout
pub const READOUT_DECIMAL_PLACES: u32 = 6;

/// Power on register values, R0..R5
pub const POWER_ON_REGISTERS: [u32; 6] = [
    0x007D_0000,
    0x2000_FFF9,
    0x1800_6E42,
    0x0000_000B,
    0x6180_B23C,
    0x0040_0005,
];
