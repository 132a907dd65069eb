use avr_device::atmega328p::PORTB;
use core::convert::Infallible;
use core::marker::PhantomData;

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// PORTB pin `P`. PB5 is the Arduino on-board LED.
#[derive(Debug)]
pub struct Pin<const P: u8, MODE> {
    _mode: PhantomData<MODE>,
}

impl<const P: u8> Pin<P, Input> {
    /// Pins start as inputs after reset.
    ///
    /// # Safety
    ///
    /// Only one `Pin` may exist per bit, and nothing else may drive DDRB or
    /// PORTB bit `P`.
    pub unsafe fn steal() -> Self {
        Pin { _mode: PhantomData }
    }
}

impl<const P: u8, MODE: PinMode> Pin<P, MODE> {
    pub fn into_output(self) -> Pin<P, Output> {
        // Set DDRB bit
        unsafe {
            port().ddrb.modify(|r, w| w.bits(r.bits() | (1 << P)));
        }
        Pin { _mode: PhantomData }
    }
}

impl<const P: u8> embedded_hal::digital::v2::OutputPin for Pin<P, Output> {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        unsafe {
            port().portb.modify(|r, w| w.bits(r.bits() | (1 << P)));
        }
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        unsafe {
            port().portb.modify(|r, w| w.bits(r.bits() & !(1 << P)));
        }
        Ok(())
    }
}

#[inline]
fn port() -> &'static avr_device::atmega328p::portb::RegisterBlock {
    unsafe { &*PORTB::ptr() }
}

// Arduino Uno pin definitions
pub mod board {
    use super::*;

    pub type Led = Pin<5, Output>;
}
