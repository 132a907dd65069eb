//! ATmega328P register file.

use super::watchdog::{self, WatchdogTimeout};
use super::{InterruptState, SleepHardware, SleepMode};
use avr_device::atmega328p::{AC, CPU, WDT};
use core::arch::asm;

const SMCR_SE: u8 = 1 << 0;
const SMCR_SM_MASK: u8 = 0b0000_1110;
const MCUSR_WDRF: u8 = 1 << 3;
const ACSR_ACD: u8 = 1 << 7;

// Inline assembly addresses SREG as I/O 0x3F and MCUCR as I/O 0x35

/// BODS and BODSE together, then BODS alone. `sleep` must follow within
/// three cycles, so any trailing instructions go in the same block.
macro_rules! bod_sequence {
    ($($then:literal),*) => {
        asm!(
            "in {tmp}, 0x35",
            "ori {tmp}, 0x60",
            "out 0x35, {tmp}",
            "andi {tmp}, 0xDF",
            "out 0x35, {tmp}",
            $($then,)*
            tmp = out(reg_upper) _,
        )
    };
}

pub struct Atmega328p {
    cpu: CPU,
    ac: AC,
    wdt: WDT,
}

impl Atmega328p {
    pub fn new(cpu: CPU, ac: AC, wdt: WDT) -> Self {
        Self { cpu, ac, wdt }
    }

    pub fn release(self) -> (CPU, AC, WDT) {
        (self.cpu, self.ac, self.wdt)
    }

    /// Periodic watchdog interrupt to bound a power-down sleep.
    ///
    /// The WDT vector must be defined or the wake-up jumps to reset.
    pub fn start_wake_timer(&mut self, timeout: WatchdogTimeout) {
        self.clear_watchdog_reset_flag();
        watchdog::start_interrupt(&self.wdt, timeout);
    }

    pub fn stop_wake_timer(&mut self) {
        watchdog::disable(&self.wdt);
    }
}

impl SleepHardware for Atmega328p {
    #[inline]
    fn power_reduction(&self) -> u8 {
        self.cpu.prr.read().bits()
    }

    #[inline]
    fn set_power_reduction(&mut self, bits: u8) {
        unsafe {
            self.cpu.prr.write(|w| w.bits(bits));
        }
    }

    #[inline]
    fn sleep_mode_field(&self) -> u8 {
        (self.cpu.smcr.read().bits() & SMCR_SM_MASK) >> 1
    }

    #[inline]
    fn set_sleep_mode(&mut self, mode: SleepMode) {
        unsafe {
            self.cpu
                .smcr
                .modify(|r, w| w.bits((r.bits() & !SMCR_SM_MASK) | mode.smcr_bits()));
        }
    }

    #[inline]
    fn disable_analog_comparator(&mut self) {
        unsafe {
            self.ac.acsr.modify(|r, w| w.bits(r.bits() | ACSR_ACD));
        }
    }

    #[inline]
    fn watchdog_reset(&mut self) {
        watchdog::feed();
    }

    #[inline]
    fn clear_watchdog_reset_flag(&mut self) {
        unsafe {
            self.cpu.mcusr.modify(|r, w| w.bits(r.bits() & !MCUSR_WDRF));
        }
    }

    #[inline]
    fn watchdog_disable(&mut self) {
        watchdog::disable(&self.wdt);
    }

    #[inline(always)]
    fn save_and_disable_interrupts(&mut self) -> InterruptState {
        let sreg: u8;
        unsafe {
            asm!(
                "in {sreg}, 0x3F",
                "cli",
                sreg = out(reg) sreg,
            );
        }
        InterruptState::from_sreg(sreg)
    }

    #[inline(always)]
    fn restore_interrupts(&mut self, state: InterruptState) {
        unsafe {
            asm!("out 0x3F, {sreg}", sreg = in(reg) state.sreg());
        }
    }

    #[inline(always)]
    fn sleep_enable(&mut self) {
        unsafe {
            self.cpu.smcr.modify(|r, w| w.bits(r.bits() | SMCR_SE));
        }
    }

    #[inline(always)]
    fn sleep_disable(&mut self) {
        unsafe {
            self.cpu.smcr.modify(|r, w| w.bits(r.bits() & !SMCR_SE));
        }
    }

    #[inline(always)]
    fn bod_disable(&mut self) {
        unsafe {
            bod_sequence!();
        }
    }

    #[inline(always)]
    fn enable_interrupts(&mut self) {
        unsafe { avr_device::interrupt::enable() };
    }

    #[inline(always)]
    fn sleep_cpu(&mut self) {
        avr_device::asm::sleep();
    }

    /// With the BOD off, one asm block: the compiler cannot place anything
    /// between the BODS write and `sleep`. The instruction after `sei`
    /// always runs before a pending interrupt is taken.
    #[inline(always)]
    fn enter_sleep(&mut self, bod_off: bool) {
        if bod_off {
            unsafe {
                bod_sequence!("sei", "sleep");
            }
        } else {
            self.enable_interrupts();
            self.sleep_cpu();
        }
    }
}
