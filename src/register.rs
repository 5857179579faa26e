//! MAX2870 registers
//!
//! Six 32-bit words, R0..R5, the low 3 bits of each word hold its address.
//! Each named field below is a `(register, offset, width)` triple, read and
//! written through [`get_bits`] / [`set_bits`].

use core::marker::PhantomData;

use crate::constants::*;


/// Replace `width` bits of `word` starting at bit `offset` with `value`,
/// every other bit is kept.
#[inline]
pub fn set_bits(word: u32, offset: u8, width: u8, value: u32) -> u32 {
    let mask = field_mask(width) << offset;
    (word & !mask) | ((value << offset) & mask)
}

/// Extract `width` bits of `word` starting at bit `offset`, right-justified.
#[inline]
pub fn get_bits(word: u32, offset: u8, width: u8) -> u32 {
    (word >> offset) & field_mask(width)
}

#[inline]
fn field_mask(width: u8) -> u32 {
    u32::MAX >> (32 - width as u32)
}


/// Register number marker types
macro_rules! gen_register_marker {
    ($r:ident, $n:tt) => {
        /// Register address marker
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        pub struct $r {}

        impl Default for Reg<$r> { #[inline] fn default() -> Self { Reg { w: $n, phantom: PhantomData::default() } } }
    }
}

gen_register_marker!(R0, 0);
gen_register_marker!(R1, 1);
gen_register_marker!(R2, 2);
gen_register_marker!(R3, 3);
gen_register_marker!(R4, 4);
gen_register_marker!(R5, 5);


/// Single config register
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Reg<R> {
    /// Config register word
    pub w: u32,
    phantom: PhantomData<R>,
}

/// Bit operations on 32bit words
impl<R> Reg<R> {
    #[inline]
    fn from_word(w: u32) -> Self {
        Reg { w, phantom: PhantomData::default() }
    }

    #[inline]
    pub fn get<F>(self: &Self) -> F
    where F: Sized + BitField<R> + From<u32>
    {
        F::from(get_bits(self.w, F::offset(), F::num_bits()))
    }

    #[inline]
    pub fn set<F>(mut self: Self, f: F) -> Self
    where F: Sized + BitField<R> + Into<u32>
    {
        self.w = set_bits(self.w, F::offset(), F::num_bits(), f.into());
        self
    }
}


/// Full set of config registers.
/// Defaults to the power-on register image.
///
/// The registers are written R5 first, R0 last; R0 double-buffers the
/// rest so the new frequency takes effect as a whole.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct RegisterSet {
    pub r0: Reg<R0>,
    pub r1: Reg<R1>,
    pub r2: Reg<R2>,
    pub r3: Reg<R3>,
    pub r4: Reg<R4>,
    pub r5: Reg<R5>,
}

impl Default for RegisterSet {
    fn default() -> Self {
        RegisterSet::from_words(POWER_ON_REGISTERS)
    }
}

/// Type-indexed register access
pub trait RIdx<R> {
    fn r(self: &Self) -> Reg<R>;
    fn update_r<F>(self: Self, f: F) -> Self where F: FnOnce(Reg<R>) -> Reg<R>;
}

macro_rules! gen_register_index {
    ($r:ident, $f:tt) => {
        impl RIdx<$r> for RegisterSet {
            #[inline]
            fn r(self: &Self) -> Reg<$r> { self.$f }
            #[inline]
            fn update_r<F>(mut self: Self, f: F) -> Self where F: FnOnce(Reg<$r>) -> Reg<$r> {
                self.$f = f(self.$f);
                self
            }
        }
    }
}

gen_register_index!(R0, r0);
gen_register_index!(R1, r1);
gen_register_index!(R2, r2);
gen_register_index!(R3, r3);
gen_register_index!(R4, r4);
gen_register_index!(R5, r5);


impl RegisterSet {

    /// Register set from raw device words, R0 first.
    pub fn from_words(w: [u32; 6]) -> Self {
        RegisterSet {
            r0: Reg::from_word(w[0]),
            r1: Reg::from_word(w[1]),
            r2: Reg::from_word(w[2]),
            r3: Reg::from_word(w[3]),
            r4: Reg::from_word(w[4]),
            r5: Reg::from_word(w[5]),
        }
    }

    /// Register values in device format, R0 first.
    #[inline]
    pub fn to_words(self: &Self) -> [u32; 6] {
        [self.r0.w, self.r1.w, self.r2.w, self.r3.w, self.r4.w, self.r5.w]
    }

    /// Get register bitfield value
    #[inline]
    pub fn get<F,R>(self: &Self) -> F
    where F: Sized + BitField<R> + From<u32>,
          Self: RIdx<R>
    {
        self.r().get()
    }

    /// Update register bitfield
    #[inline]
    pub fn set<F,R>(self: Self, f: F) -> Self
    where F: Sized + BitField<R> + Into<u32>,
          Self: RIdx<R>
    {
        self.update_r(|r| r.set(f))
    }
}



/// Bit field location within register `R`
pub trait BitField<R> {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
    ($r:ty, $n:ident, $nb:tt, $off:tt) => {
        impl BitField<$r> for $n {
            #[inline] fn num_bits() -> u8 { $nb }
            #[inline] fn offset() -> u8 { $off }
        }
    }
}

/// Small bitfield-encoded numbes boilerplate
macro_rules! gen_bitfield_struct {
    ($(#[$meta:meta])*, $r:ty, $n:ident, $v:ty, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $n(pub $v);

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u32> for $n { #[inline] fn from(x: u32) -> Self { $n(x as $v) } }
        impl From<$n> for u32 { #[inline] fn from(x: $n) -> u32 { x.0 as u32 } }
    };
}

/// Enumerated bitfield boilerplate.
/// Every bit pattern of the field must be listed, the first variant
/// absorbs anything else.
macro_rules! gen_bitfield_enum {
    ($(#[$meta:meta])*, $r:ty, $n:ident, $nb:tt, $off:tt,
     { $(#[$m0:meta])* $v0:ident = $x0:expr $(, $(#[$m:meta])* $v:ident = $x:expr)* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub enum $n {
            $(#[$m0])* $v0 = $x0,
            $( $(#[$m])* $v = $x, )*
        }

        gen_bitfield_impl!($r, $n, $nb, $off);

        impl From<u32> for $n {
            #[inline]
            fn from(x: u32) -> Self {
                $( if x == $x { return $n::$v; } )*
                $n::$v0
            }
        }
        impl From<$n> for u32 { #[inline] fn from(x: $n) -> u32 { x as u32 } }
    }
}


gen_bitfield_enum!(
    /// DB31 selects integer-N mode. It must be set together with LDF = 1
    /// and CPL = 0 when FRAC is 0.
    , R0, IntMode, 1, 31, {
        FracN = 0,
        IntN = 1,
    }
);

gen_bitfield_struct!(
    /// The 16 N bits (Bits[DB30:DB15]) set the integer part of the feedback
    /// division factor. 16 to 65535 in integer-N mode, 19 to 4091 in
    /// fractional-N mode.
    , R0, Int, u16, 16, 15
);

gen_bitfield_struct!(
    /// The 12 FRAC bits (Bits[DB14:DB3]) set the numerator of the fractional
    /// division, 0 to MOD - 1.
    , R0, Frac, u16, 12, 3
);


gen_bitfield_enum!(
    /// DB31 clamps the charge pump output. Enabled for integer-N,
    /// disabled for fractional-N.
    , R1, ChargePumpClamp, 1, 31, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_enum!(
    /// Charge pump linearity, Bits[DB30:DB29]. Must be `Disabled` in
    /// integer-N mode, 10% is recommended for fractional-N.
    , R1, ChargePumpLinearity, 2, 29, {
        Disabled = 0,
        Cpl10 = 1,
        Cpl20 = 2,
        Cpl30 = 3,
    }
);

gen_bitfield_struct!(
    /// 12-Bit Phase Value, Bits[DB26:DB15]. Must be less than MOD.
    , R1, Phase, u16, 12, 15
);

gen_bitfield_struct!(
    /// 12-Bit Modulus Value (MOD), Bits[DB14:DB3], 2 to 4095.
    /// The ratio of the PFD frequency to the channel step resolution
    /// on the VCO.
    , R1, Mod, u16, 12, 3
);


gen_bitfield_enum!(
    /// Lock detect speed, DB31. Must be `Fast` for PFD above 32 MHz.
    , R2, LockDetectSpeed, 1, 31, {
        Slow = 0,
        Fast = 1,
    }
);

gen_bitfield_enum!(
    /// Noise mode, Bits[DB30:DB29]
    , R2, NoiseMode, 2, 29, {
        LowNoise = 0,
        Reserved = 1,
        LowSpur1 = 2,
        LowSpur2 = 3,
    }
);

gen_bitfield_struct!(
    /// MUX output select, Bits[DB28:DB26] (MSB lives in R5)
    , R2, Muxout, u8, 3, 26
);

gen_bitfield_enum!(
    /// Reference doubler, DB25. REFin must not exceed 30 MHz when enabled.
    , R2, RefDoubler, 1, 25, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_enum!(
    /// Reference divide-by-2 flip-flop between the R counter and the PFD, DB24.
    , R2, Rdiv2, 1, 24, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_struct!(
    /// The 10-bit R counter (Bits[DB23:DB14]) divides REFin down to the
    /// PFD reference. 1 to 1023.
    , R2, R, u16, 10, 14
);

gen_bitfield_enum!(
    /// Double buffer of the R4 output divider select, DB13
    , R2, DoubleBuffer, 1, 13, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_struct!(
    /// Charge pump current, Bits[DB12:DB9]: (1 + code) * 0.32 mA
    /// with the recommended 5.1 kOhm RSET.
    , R2, ChargePumpCurrent, u8, 4, 9
);

gen_bitfield_enum!(
    /// Lock detect function, DB8. `FracN` for fractional-N, `IntN`
    /// for integer-N.
    , R2, Ldf, 1, 8, {
        FracN = 0,
        IntN = 1,
    }
);

gen_bitfield_enum!(
    /// Lock detect precision, DB7
    , R2, Ldp, 1, 7, {
        Ldp10ns = 0,
        Ldp6ns = 1,
    }
);

gen_bitfield_enum!(
    /// Phase detector polarity, DB6. `Positive` for passive or
    /// non-inverting active loop filters.
    , R2, PhaseDetectorPolarity, 1, 6, {
        Negative = 0,
        Positive = 1,
    }
);

gen_bitfield_enum!(
    /// Software shutdown, DB5
    , R2, PowerDown, 1, 5, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_enum!(
    /// Charge pump three-state, DB4
    , R2, ChargePumpThreeState, 1, 4, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_enum!(
    /// R and N counter reset, DB3
    , R2, CounterReset, 1, 3, {
        Disabled = 0,
        Enabled = 1,
    }
);


gen_bitfield_enum!(
    /// Clock divider mode, Bits[DB16:DB15]
    , R3, ClockDividerMode, 2, 15, {
        Off = 0,
        FastLock = 1,
        Resync = 2,
        Reserved = 3,
    }
);

gen_bitfield_struct!(
    /// 12-Bit clock divider value, Bits[DB14:DB3]
    , R3, ClockDividerValue, u16, 12, 3
);


gen_bitfield_struct!(
    /// Band select clock divider MSBs, Bits[DB25:DB24]
    , R4, BandSelectClockDivMsb, u8, 2, 24
);

gen_bitfield_enum!(
    /// VCO to N counter feedback, DB23
    , R4, FeedbackSelect, 1, 23, {
        Divided = 0,
        Fundamental = 1,
    }
);

gen_bitfield_struct!(
    /// RF output divider select, Bits[DB22:DB20]: divide by 2^value
    , R4, RfDividerSelect, u8, 3, 20
);

gen_bitfield_struct!(
    /// Band select clock divider, Bits[DB19:DB12]
    , R4, BandSelectClockDiv, u8, 8, 12
);

gen_bitfield_enum!(
    /// RFOUTB source, DB9: output divider or the VCO fundamental
    , R4, AuxOutputSelect, 1, 9, {
        Divided = 0,
        Fundamental = 1,
    }
);

gen_bitfield_enum!(
    /// RFOUTB enable, DB8
    , R4, AuxOutputEnable, 1, 8, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_struct!(
    /// RFOUTB power, Bits[DB7:DB6]: -4, -1, +2, +5 dBm
    , R4, AuxOutputPower, u8, 2, 6
);

gen_bitfield_enum!(
    /// RFOUTA enable, DB5
    , R4, RfOutputEnable, 1, 5, {
        Disabled = 0,
        Enabled = 1,
    }
);

gen_bitfield_struct!(
    /// RFOUTA power, Bits[DB4:DB3]: -4, -1, +2, +5 dBm
    , R4, OutputPower, u8, 2, 3
);


gen_bitfield_enum!(
    /// F01, DB24: with FRAC = 0 run integer-N (`IntN`) or stay
    /// fractional-N (`FracN`)
    , R5, F01, 1, 24, {
        FracN = 0,
        IntN = 1,
    }
);

gen_bitfield_enum!(
    /// Lock detect pin function, Bits[DB23:DB22]
    , R5, LockDetectPin, 2, 22, {
        Low = 0,
        DigitalLockDetect = 1,
        AnalogLockDetect = 2,
        High = 3,
    }
);
