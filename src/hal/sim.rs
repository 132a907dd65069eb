//! Simulated ATmega328P register file for host tests.
//!
//! Holds the registers the sleep sequence touches and records every access,
//! plus hook invocations, into one ordered trace. The state sits behind a
//! `RefCell` so the controller's hardware handle and the test's hooks can
//! write to the same trace.

use super::{InterruptState, SleepHardware, SleepMode, SREG_I};
use core::cell::RefCell;
use heapless::Vec;

/// Maximum number of recorded events. Later events are dropped.
pub const TRACE_LEN: usize = 64;

pub const SMCR_SE: u8 = 1 << 0;
pub const SMCR_SM_MASK: u8 = 0b0000_1110;
pub const MCUCR_BODSE: u8 = 1 << 5;
pub const MCUCR_BODS: u8 = 1 << 6;
pub const MCUSR_PORF: u8 = 1 << 0;
pub const MCUSR_WDRF: u8 = 1 << 3;
pub const WDTCSR_WDE: u8 = 1 << 3;
pub const ACSR_ACD: u8 = 1 << 7;

/// One observable step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PrrWrite(u8),
    SleepModeWrite(SleepMode),
    AnalogComparatorOff,
    WatchdogReset,
    WatchdogFlagClear,
    WatchdogDisable,
    InterruptsDisabled,
    SleepEnable,
    BodDisable,
    InterruptsEnabled,
    /// `sleep` executed. The core only halts when both are true.
    Sleep { armed: bool, interrupts: bool },
    SleepDisable,
    InterruptsRestored(bool),
    PreSleepHook,
    WakeHook,
}

#[derive(Debug)]
struct Registers {
    prr: u8,
    smcr: u8,
    sreg: u8,
    mcucr: u8,
    mcusr: u8,
    wdtcsr: u8,
    acsr: u8,
    watchdog_resets: u16,
    trace: Vec<Event, TRACE_LEN>,
}

/// The simulated chip.
#[derive(Debug)]
pub struct Simulator {
    regs: RefCell<Registers>,
}

impl Simulator {
    /// Power-on state with interrupts enabled, as firmware runs after init.
    pub const fn new() -> Self {
        Self {
            regs: RefCell::new(Registers {
                prr: 0,
                smcr: 0,
                sreg: SREG_I,
                mcucr: 0,
                mcusr: 0,
                wdtcsr: 0,
                acsr: 0,
                watchdog_resets: 0,
                trace: Vec::new(),
            }),
        }
    }

    /// Hardware handle to give to a controller.
    pub fn hardware(&self) -> SimHardware<'_> {
        SimHardware { sim: self }
    }

    /// Record a hook invocation from test code.
    pub fn record(&self, event: Event) {
        // Full trace drops the event
        self.regs.borrow_mut().trace.push(event).ok();
    }

    pub fn trace(&self) -> Vec<Event, TRACE_LEN> {
        self.regs.borrow().trace.clone()
    }

    pub fn clear_trace(&self) {
        self.regs.borrow_mut().trace.clear();
    }

    /// Index of the first occurrence of `event` in the trace.
    pub fn position(&self, event: Event) -> Option<usize> {
        self.regs.borrow().trace.iter().position(|e| *e == event)
    }

    /// Index of the first `Sleep` event.
    pub fn sleep_position(&self) -> Option<usize> {
        self.regs
            .borrow()
            .trace
            .iter()
            .position(|e| matches!(e, Event::Sleep { .. }))
    }

    pub fn count(&self, event: Event) -> usize {
        self.regs.borrow().trace.iter().filter(|e| **e == event).count()
    }

    pub fn prr(&self) -> u8 {
        self.regs.borrow().prr
    }

    pub fn set_prr(&self, prr: u8) {
        self.regs.borrow_mut().prr = prr;
    }

    pub fn smcr(&self) -> u8 {
        self.regs.borrow().smcr
    }

    pub fn sreg(&self) -> u8 {
        self.regs.borrow().sreg
    }

    pub fn set_sreg(&self, sreg: u8) {
        self.regs.borrow_mut().sreg = sreg;
    }

    pub fn mcucr(&self) -> u8 {
        self.regs.borrow().mcucr
    }

    pub fn mcusr(&self) -> u8 {
        self.regs.borrow().mcusr
    }

    pub fn set_mcusr(&self, mcusr: u8) {
        self.regs.borrow_mut().mcusr = mcusr;
    }

    pub fn wdtcsr(&self) -> u8 {
        self.regs.borrow().wdtcsr
    }

    pub fn set_wdtcsr(&self, wdtcsr: u8) {
        self.regs.borrow_mut().wdtcsr = wdtcsr;
    }

    pub fn acsr(&self) -> u8 {
        self.regs.borrow().acsr
    }

    pub fn watchdog_resets(&self) -> u16 {
        self.regs.borrow().watchdog_resets
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing handle implementing [`SleepHardware`] over a [`Simulator`].
#[derive(Debug, Clone, Copy)]
pub struct SimHardware<'a> {
    sim: &'a Simulator,
}

impl SimHardware<'_> {
    fn update(&mut self, event: Event, f: impl FnOnce(&mut Registers)) {
        let mut regs = self.sim.regs.borrow_mut();
        f(&mut regs);
        regs.trace.push(event).ok();
    }
}

impl SleepHardware for SimHardware<'_> {
    fn power_reduction(&self) -> u8 {
        self.sim.prr()
    }

    fn set_power_reduction(&mut self, bits: u8) {
        self.update(Event::PrrWrite(bits), |r| r.prr = bits);
    }

    fn sleep_mode_field(&self) -> u8 {
        (self.sim.smcr() & SMCR_SM_MASK) >> 1
    }

    fn set_sleep_mode(&mut self, mode: SleepMode) {
        self.update(Event::SleepModeWrite(mode), |r| {
            r.smcr = (r.smcr & !SMCR_SM_MASK) | mode.smcr_bits();
        });
    }

    fn disable_analog_comparator(&mut self) {
        self.update(Event::AnalogComparatorOff, |r| r.acsr |= ACSR_ACD);
    }

    fn watchdog_reset(&mut self) {
        self.update(Event::WatchdogReset, |r| {
            r.watchdog_resets = r.watchdog_resets.wrapping_add(1);
        });
    }

    fn clear_watchdog_reset_flag(&mut self) {
        self.update(Event::WatchdogFlagClear, |r| r.mcusr &= !MCUSR_WDRF);
    }

    fn watchdog_disable(&mut self) {
        self.update(Event::WatchdogDisable, |r| {
            // WDRF set overrides WDE
            r.wdtcsr = if r.mcusr & MCUSR_WDRF != 0 {
                WDTCSR_WDE
            } else {
                0
            };
        });
    }

    fn save_and_disable_interrupts(&mut self) -> InterruptState {
        let mut saved = 0;
        self.update(Event::InterruptsDisabled, |r| {
            saved = r.sreg;
            r.sreg &= !SREG_I;
        });
        InterruptState::from_sreg(saved)
    }

    fn restore_interrupts(&mut self, state: InterruptState) {
        self.update(
            Event::InterruptsRestored(state.interrupts_enabled()),
            |r| r.sreg = state.sreg(),
        );
    }

    fn sleep_enable(&mut self) {
        self.update(Event::SleepEnable, |r| r.smcr |= SMCR_SE);
    }

    fn sleep_disable(&mut self) {
        self.update(Event::SleepDisable, |r| r.smcr &= !SMCR_SE);
    }

    fn bod_disable(&mut self) {
        self.update(Event::BodDisable, |r| {
            r.mcucr |= MCUCR_BODS | MCUCR_BODSE;
            r.mcucr &= !MCUCR_BODSE;
        });
    }

    fn enable_interrupts(&mut self) {
        self.update(Event::InterruptsEnabled, |r| r.sreg |= SREG_I);
    }

    fn sleep_cpu(&mut self) {
        let (armed, interrupts) = {
            let regs = self.sim.regs.borrow();
            (regs.smcr & SMCR_SE != 0, regs.sreg & SREG_I != 0)
        };
        self.update(Event::Sleep { armed, interrupts }, |r| {
            // Hardware clears BODS three cycles after setting it
            r.mcucr &= !MCUCR_BODS;
        });
    }
}
