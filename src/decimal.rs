//! Exact decimal arithmetic for frequency planning.
//!
//! A 6 GHz target with micro-hertz resolution already needs 16 significant
//! digits, multiplied by dividers of up to 128 and divided by PFD values with
//! non-terminating expansions. `f32`/`f64` silently lose the low digits, so
//! every frequency the solver compares against a hardware limit is carried as
//! an exact rational instead.

use core::{
    fmt,
    ops::{Add, Div, Mul, Sub},
    str::FromStr,
};

use num_rational::Ratio;
use num_traits::{Signed, Zero};

use crate::errors::*;

/// Most fractional digits accepted when parsing
pub const MAX_SCALE: usize = 18;

/// Exact decimal value.
///
/// Arithmetic never rounds. Conversion back to an integer either truncates
/// toward zero ([`Decimal::trunc`]) or goes through [`Decimal::round_half_up`],
/// which is the only rounding rule in the crate.
#[derive(Debug,Copy,Clone,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct Decimal(Ratio<i128>);

impl Decimal {
    pub const ZERO: Decimal = Decimal(Ratio::new_raw(0, 1));

    /// `numer / denom`, `denom` must not be 0
    #[inline]
    pub fn ratio(numer: i128, denom: i128) -> Self {
        Decimal(Ratio::new(numer, denom))
    }

    /// `10^-places`
    pub fn epsilon(places: u32) -> Self {
        Decimal::ratio(1, 10i128.pow(places))
    }

    #[inline]
    pub fn is_zero(self: &Self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_integer(self: &Self) -> bool {
        self.0.is_integer()
    }

    #[inline]
    pub fn abs(self: Self) -> Self {
        Decimal(self.0.abs())
    }

    /// Integer part, truncated toward zero
    #[inline]
    pub fn trunc(self: Self) -> i128 {
        self.0.to_integer()
    }

    /// Adds half an epsilon at `places` decimal places and drops every digit
    /// below that place (truncating toward zero).
    ///
    /// `x.round_half_up_at(0)` is `trunc(x + 0.5)`.
    pub fn round_half_up_at(self: Self, places: u32) -> Self {
        let scale = Decimal::from(10u64.pow(places));
        let bias = Decimal::ratio(1, 2);
        Decimal::from((self * scale + bias).trunc()) / scale
    }

    /// `trunc(x + 0.5)`
    #[inline]
    pub fn round_half_up(self: Self) -> i128 {
        self.round_half_up_at(0).trunc()
    }

    /// Fixed-point rendering with exactly `places` decimals, digits below
    /// are truncated.
    pub fn fixed(self: Self, places: u32) -> Fixed {
        Fixed { value: self, places }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    /// Parses `"ddd"`, `"ddd."`, `".ddd"` or `"ddd.ddd"`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let (int, frac) = match s.find('.') {
            Some(i) => (&s[..i], &s[i + 1..]),
            None => (s, ""),
        };
        if (int.is_empty() && frac.is_empty()) || frac.len() > MAX_SCALE {
            return Err(Error::MalformedFrequency);
        }

        let mut numer: i128 = 0;
        for c in int.bytes().chain(frac.bytes()) {
            let digit = match c {
                b'0'..=b'9' => (c - b'0') as i128,
                _ => return Err(Error::MalformedFrequency),
            };
            numer = numer
                .checked_mul(10)
                .and_then(|n| n.checked_add(digit))
                .ok_or(Error::MalformedFrequency)?;
        }

        Ok(Decimal::ratio(numer, 10i128.pow(frac.len() as u32)))
    }
}

macro_rules! gen_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Decimal {
                #[inline]
                fn from(x: $t) -> Self { Decimal(Ratio::from_integer(x as i128)) }
            }
        )*
    }
}

gen_from_int!(u8, u16, u32, u64, i32, i64, i128);

macro_rules! gen_binop {
    ($tr:ident, $f:ident) => {
        impl $tr for Decimal {
            type Output = Decimal;
            #[inline]
            fn $f(self, rhs: Decimal) -> Decimal { Decimal(self.0.$f(rhs.0)) }
        }
    }
}

gen_binop!(Add, add);
gen_binop!(Sub, sub);
gen_binop!(Mul, mul);
gen_binop!(Div, div);


/// Fixed-point view of a [`Decimal`], see [`Decimal::fixed`]
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct Fixed {
    value: Decimal,
    places: u32,
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10i128.pow(self.places);
        let scaled = (self.value.abs() * Decimal::from(scale)).trunc();
        if self.value.0.is_negative() && scaled != 0 {
            f.write_str("-")?;
        }
        write!(f, "{}", scaled / scale)?;
        if self.places > 0 {
            write!(f, ".{:0width$}", scaled % scale, width = self.places as usize)?;
        }
        Ok(())
    }
}
