//! Sleep modes and the set of peripherals powered off around a sleep cycle.

use bitflags::bitflags;
use core::ops::{BitOr, BitOrAssign};
use ufmt::derive::uDebug;
use ufmt::{uDisplay, uWrite, Formatter};

/// Sleep depth, encoded as the SMCR `SM2:0` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uDebug)]
#[repr(u8)]
pub enum SleepMode {
    Idle = 0,
    AdcNoiseReduction = 1,
    PowerDown = 2,
    PowerSave = 3,
    Standby = 6,
    ExtendedStandby = 7,
}

impl SleepMode {
    pub const ALL: [SleepMode; 6] = [
        SleepMode::Idle,
        SleepMode::AdcNoiseReduction,
        SleepMode::PowerDown,
        SleepMode::PowerSave,
        SleepMode::Standby,
        SleepMode::ExtendedStandby,
    ];

    /// Value of the field as it sits in SMCR (bits 3:1).
    #[inline]
    pub const fn smcr_bits(self) -> u8 {
        (self as u8) << 1
    }

    /// Modes that keep timer 2 clocked from its asynchronous oscillator.
    #[inline]
    pub const fn needs_async_timer2(self) -> bool {
        matches!(self, SleepMode::PowerSave | SleepMode::ExtendedStandby)
    }
}

impl TryFrom<u8> for SleepMode {
    type Error = Error;

    fn try_from(sm: u8) -> Result<Self, Self::Error> {
        match sm {
            0 => Ok(SleepMode::Idle),
            1 => Ok(SleepMode::AdcNoiseReduction),
            2 => Ok(SleepMode::PowerDown),
            3 => Ok(SleepMode::PowerSave),
            6 => Ok(SleepMode::Standby),
            7 => Ok(SleepMode::ExtendedStandby),
            other => Err(Error::InvalidSleepMode(other)),
        }
    }
}

bitflags! {
    /// Bits of the power reduction register. A set bit stops the clock of
    /// that peripheral.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerReduction: u8 {
        const ADC = 1 << 0;
        const USART0 = 1 << 1;
        const SPI = 1 << 2;
        const TIMER1 = 1 << 3;
        const TIMER0 = 1 << 5;
        const TIMER2 = 1 << 6;
        const TWI = 1 << 7;
    }
}

bitflags! {
    /// Peripherals with no PRR bit. Each one has its own shutdown sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Special: u8 {
        /// Analog comparator. Not re-enabled on wake.
        const AC = 1 << 0;
        /// Brown-out detector, off for the duration of the sleep only.
        const BOD = 1 << 1;
        /// Watchdog timer. Not restarted on wake.
        const WDT = 1 << 2;
    }
}

/// Everything to power off for the next sleep cycle.
///
/// The packed 16-bit form keeps the PRR bits in the low byte and the
/// [`Special`] flags in the high byte. Internally the two halves never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerOff {
    pub reduction: PowerReduction,
    pub special: Special,
}

impl PowerOff {
    pub const NONE: Self = Self::new(PowerReduction::empty(), Special::empty());
    pub const ADC: Self = Self::reduce(PowerReduction::ADC);
    pub const USART0: Self = Self::reduce(PowerReduction::USART0);
    pub const SPI: Self = Self::reduce(PowerReduction::SPI);
    pub const TIMER1: Self = Self::reduce(PowerReduction::TIMER1);
    pub const TIMER0: Self = Self::reduce(PowerReduction::TIMER0);
    pub const TIMER2: Self = Self::reduce(PowerReduction::TIMER2);
    pub const TWI: Self = Self::reduce(PowerReduction::TWI);
    /// All PRR bits, 0x00EF.
    pub const PRR_ALL: Self = Self::reduce(PowerReduction::all());
    pub const AC: Self = Self::new(PowerReduction::empty(), Special::AC);
    pub const BOD: Self = Self::new(PowerReduction::empty(), Special::BOD);
    pub const WDT: Self = Self::new(PowerReduction::empty(), Special::WDT);
    /// 0x07EF
    pub const EVERYTHING: Self = Self::new(PowerReduction::all(), Special::all());

    /// Bits that have no meaning in the packed form.
    const RESERVED: u16 = 0xF810;

    #[inline]
    pub const fn new(reduction: PowerReduction, special: Special) -> Self {
        Self { reduction, special }
    }

    #[inline]
    const fn reduce(reduction: PowerReduction) -> Self {
        Self::new(reduction, Special::empty())
    }

    /// Packed form, PRR bits low and special flags high.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.reduction.bits() as u16 | (self.special.bits() as u16) << 8
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self::new(
            self.reduction.union(other.reduction),
            self.special.union(other.special),
        )
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.reduction.contains(other.reduction) && self.special.contains(other.special)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.reduction.is_empty() && self.special.is_empty()
    }
}

impl Default for PowerOff {
    fn default() -> Self {
        Self::NONE
    }
}

impl BitOr for PowerOff {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for PowerOff {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl From<PowerReduction> for PowerOff {
    fn from(reduction: PowerReduction) -> Self {
        Self::reduce(reduction)
    }
}

impl From<Special> for PowerOff {
    fn from(special: Special) -> Self {
        Self::new(PowerReduction::empty(), special)
    }
}

impl TryFrom<u16> for PowerOff {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        if bits & Self::RESERVED != 0 {
            return Err(Error::ReservedPowerBit(bits));
        }
        Ok(Self::new(
            PowerReduction::from_bits_retain(bits as u8),
            Special::from_bits_retain((bits >> 8) as u8),
        ))
    }
}

impl ufmt::uDebug for PowerOff {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str("0x")?;
        uDisplay::fmt(&Hex::word(self.bits()), f)
    }
}

/// Fixed-width upper-case hex, the way the serial console prints registers.
pub(crate) struct Hex {
    value: u16,
    digits: usize,
}

impl Hex {
    pub(crate) const fn byte(value: u8) -> Self {
        Self { value: value as u16, digits: 2 }
    }

    pub(crate) const fn word(value: u16) -> Self {
        Self { value, digits: 4 }
    }
}

impl uDisplay for Hex {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        const HEX_CHARS: [u8; 16] = *b"0123456789ABCDEF";
        let mut buf = [0u8; 4];
        for i in 0..self.digits {
            let shift = 4 * (self.digits - 1 - i);
            buf[i] = HEX_CHARS[((self.value >> shift) & 0xF) as usize];
        }
        // Only ASCII hex digits were written
        f.write_str(core::str::from_utf8(&buf[..self.digits]).unwrap_or("?"))
    }
}

/// Rejected raw configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uDebug)]
pub enum Error {
    /// `SM2:0` value with no sleep mode behind it.
    InvalidSleepMode(u8),
    /// Packed power-off word using bit 4 or bits 11..15.
    ReservedPowerBit(u16),
}
