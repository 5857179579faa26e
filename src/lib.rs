#![cfg_attr(not(test), no_std)]

//! [MAX2870](https://www.analog.com/en/products/max2870.html) wideband
//! synthesizer driver.
//!
//! Frequencies are planned with exact rational arithmetic, either on a
//! channel raster ([`SolveMode::ChannelStep`]) or by searching for the
//! fractional modulus with the smallest residual error
//! ([`SolveMode::Precision`]).

#[macro_use]
mod fmt;

pub mod constants;
pub mod decimal;
pub mod errors;
pub mod register;
pub mod refin;
pub mod frequency;
pub mod config;
pub mod device;

pub use crate::{
    config::{OutputConfig, Outcome, Synthesizer},
    decimal::Decimal,
    device::Max2870,
    errors::Error,
    frequency::{Milliseconds, NoTimeout, PllParams, SolveMode},
    refin::ReferenceDivision,
};
