//! Sleep and peripheral power-off for the ATmega328P.
//!
//! [`SleepController`] runs one sleep-wake cycle at a time over any
//! [`hal::SleepHardware`]: the real register file on AVR targets, or
//! [`hal::sim`] on the host.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

pub mod config;
pub mod drivers;
pub mod hal;
pub mod sleep;

pub use config::TargetCaps;
pub use hal::{PowerOff, SleepMode};
pub use sleep::{Hook, SleepController};
