//! Configuration constants for the ATmega328P sleep firmware

use crate::hal::SleepMode;

/// CPU frequency in Hz, from `AVR_CPU_FREQUENCY_HZ` at build time
pub const CPU_FREQ_HZ: u32 = parse_u32(env!("MCU_FREQ_HZ"));

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Awake time between two sleep cycles of the demo firmware, in loop passes
pub const AWAKE_PASSES: u16 = 1000;

const fn parse_u32(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

/// What the board lets the sleep controller use.
///
/// Resolved once at startup and handed to the controller, so the mode
/// substitution below runs the same way on the host as on the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetCaps {
    /// Timer 2 can run from a watch crystal on TOSC1/TOSC2. False on boards
    /// whose system crystal occupies those pins.
    pub async_timer2: bool,
}

impl TargetCaps {
    /// Arduino Uno/Nano style boards.
    pub const ARDUINO: Self = Self { async_timer2: false };

    /// Chip running from the internal oscillator, TOSC pins free.
    pub const BARE_CHIP: Self = Self { async_timer2: true };

    /// Selected by the `arduino` cargo feature.
    pub const BUILD: Self = if cfg!(feature = "arduino") {
        Self::ARDUINO
    } else {
        Self::BARE_CHIP
    };

    /// Mode actually committed to SMCR for a requested mode.
    ///
    /// Without an asynchronous timer 2, power-save falls back to power-down
    /// and extended standby falls back to standby.
    pub const fn resolve(self, mode: SleepMode) -> SleepMode {
        if self.async_timer2 {
            return mode;
        }
        match mode {
            SleepMode::PowerSave => SleepMode::PowerDown,
            SleepMode::ExtendedStandby => SleepMode::Standby,
            other => other,
        }
    }
}
