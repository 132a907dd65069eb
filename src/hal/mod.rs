pub mod power;
pub mod sim;

#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub mod atmega328p;
#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub mod gpio;
#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub mod uart;
#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub mod watchdog;

// Re-export commonly used types
pub use power::{Error, PowerOff, PowerReduction, SleepMode, Special};

#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub use atmega328p::Atmega328p;
#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub use gpio::{Input, Output, Pin};
#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub use uart::Usart0;
#[cfg(all(target_arch = "avr", feature = "atmega328p"))]
pub use watchdog::WatchdogTimeout;

/// Global interrupt flag in SREG.
pub const SREG_I: u8 = 1 << 7;

/// SREG as it was before interrupts were masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptState(u8);

impl InterruptState {
    #[inline]
    pub const fn from_sreg(sreg: u8) -> Self {
        Self(sreg)
    }

    #[inline]
    pub const fn sreg(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn interrupts_enabled(self) -> bool {
        self.0 & SREG_I != 0
    }
}

/// Register-level operations the sleep sequence is built from.
///
/// One method per data sheet step. Implementations must perform each step
/// as a single register access (or the documented timed sequence) and must
/// not reorder them.
pub trait SleepHardware {
    /// Current power reduction register.
    fn power_reduction(&self) -> u8;

    fn set_power_reduction(&mut self, bits: u8);

    /// Raw `SM2:0` field of SMCR.
    fn sleep_mode_field(&self) -> u8;

    /// Write `SM2:0`, leaving SE untouched.
    fn set_sleep_mode(&mut self, mode: SleepMode);

    /// Set ACSR.ACD.
    fn disable_analog_comparator(&mut self);

    /// `wdr`
    fn watchdog_reset(&mut self);

    /// Clear MCUSR.WDRF only. WDRF forces WDE on while it is set.
    fn clear_watchdog_reset_flag(&mut self);

    /// Timed WDCE/WDE sequence clearing WDTCSR.
    fn watchdog_disable(&mut self);

    /// Read SREG, then `cli`.
    fn save_and_disable_interrupts(&mut self) -> InterruptState;

    /// Write SREG back.
    fn restore_interrupts(&mut self, state: InterruptState);

    /// Set SMCR.SE.
    fn sleep_enable(&mut self);

    /// Clear SMCR.SE.
    fn sleep_disable(&mut self);

    /// Timed BODS/BODSE write. Only holds if `sleep` follows within three
    /// cycles.
    fn bod_disable(&mut self);

    /// `sei`
    fn enable_interrupts(&mut self);

    /// `sleep`. Returns once an interrupt handler has run.
    fn sleep_cpu(&mut self);

    /// Optional BOD disable, `sei`, `sleep`, back to back.
    ///
    /// Targets where the compiler could schedule code between the separate
    /// steps must override this with a single instruction sequence.
    #[inline(always)]
    fn enter_sleep(&mut self, bod_off: bool) {
        if bod_off {
            self.bod_disable();
        }
        self.enable_interrupts();
        self.sleep_cpu();
    }
}
