//! Sleep controller: one sleep-wake cycle with peripheral power-off.
//!
//! To put the device to sleep:
//!
//! - pins should be Hi-Z, digital input disabled and not driving loads;
//! - select the sleep mode in SMCR `SM2:0`;
//! - power off unused peripherals;
//! - disable interrupts, set SE;
//! - if disabling the BOD, do it right before `sleep` (three cycles);
//! - enable interrupts, execute `sleep`.
//!
//! On waking up: clear SE, restore PRR, restore SREG. TWI and SPI need to
//! be reconfigured if they were powered off. The analog comparator and the
//! watchdog are not re-enabled.

use crate::config::TargetCaps;
use crate::hal::power::Hex;
use crate::hal::{Error, PowerOff, SleepHardware, SleepMode, Special};
use ufmt::{uWrite, uwrite};

/// Caller-owned hook, run synchronously. The controller never owns it.
pub type Hook<'h> = &'h dyn Fn();

pub struct SleepController<'h, H> {
    hw: H,
    caps: TargetCaps,
    mode: SleepMode,
    power_off: PowerOff,
    pre_sleep: Option<Hook<'h>>,
    wake_up: Option<Hook<'h>>,
}

impl<'h, H: SleepHardware> SleepController<'h, H> {
    /// Takes the register handles. SMCR is not written until [`configure`].
    ///
    /// [`configure`]: SleepController::configure
    pub fn new(hw: H, caps: TargetCaps) -> Self {
        Self {
            hw,
            caps,
            mode: SleepMode::Idle,
            power_off: PowerOff::NONE,
            pre_sleep: None,
            wake_up: None,
        }
    }

    /// Select the sleep mode and what to power off for the next cycles.
    ///
    /// Modes the board cannot use are replaced by their fallback, see
    /// [`TargetCaps::resolve`].
    pub fn configure(&mut self, mode: SleepMode, power_off: PowerOff) {
        self.power_off = power_off;
        self.mode = self.caps.resolve(mode);
        self.hw.set_sleep_mode(self.mode);
    }

    /// Sleep until an interrupt, then restore PRR and SREG.
    ///
    /// A reset instead of an interrupt never returns here.
    pub fn sleep(&mut self) {
        let special = self.power_off.special;

        let saved_prr = self.hw.power_reduction();
        self.hw.set_power_reduction(self.power_off.reduction.bits());

        if special.contains(Special::AC) {
            self.hw.disable_analog_comparator();
        }

        // Reset and WDRF clear must precede the disable or WDE stays forced on
        if special.contains(Special::WDT) {
            self.hw.watchdog_reset();
            self.hw.clear_watchdog_reset_flag();
            self.hw.watchdog_disable();
        }

        if let Some(hook) = self.pre_sleep {
            hook();
        }

        let sreg = self.hw.save_and_disable_interrupts();
        self.hw.sleep_enable();
        self.hw.enter_sleep(special.contains(Special::BOD));

        // Woken by an interrupt
        self.hw.sleep_disable();
        self.hw.set_power_reduction(saved_prr);
        self.hw.restore_interrupts(sreg);

        if let Some(hook) = self.wake_up {
            hook();
        }
    }

    /// Run `hook` right before interrupts are masked. Replaces any previous one.
    pub fn attach_pre_sleep(&mut self, hook: Hook<'h>) {
        self.pre_sleep = Some(hook);
    }

    /// Run `hook` after PRR and SREG are restored. Replaces any previous one.
    ///
    /// Peripherals brought back by the PRR restore (TWI, SPI) are clocked
    /// again but may need re-initialising here.
    pub fn attach_wake_up(&mut self, hook: Hook<'h>) {
        self.wake_up = Some(hook);
    }

    pub fn detach_pre_sleep(&mut self) {
        self.pre_sleep = None;
    }

    pub fn detach_wake_up(&mut self) {
        self.wake_up = None;
    }

    /// Mode last committed to SMCR.
    #[inline]
    pub fn mode(&self) -> SleepMode {
        self.mode
    }

    #[inline]
    pub fn power_off(&self) -> PowerOff {
        self.power_off
    }

    #[inline]
    pub fn caps(&self) -> TargetCaps {
        self.caps
    }

    /// Mode read back from SMCR.
    pub fn committed_mode(&self) -> Result<SleepMode, Error> {
        SleepMode::try_from(self.hw.sleep_mode_field())
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    /// Give the register handles back.
    pub fn release(self) -> H {
        self.hw
    }

    /// One-line summary for the serial console. Not for use inside hooks.
    pub fn describe<W>(&self, w: &mut W) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        uwrite!(
            w,
            "sleep mode={:?} power_off={:?} prr=0x{}",
            self.mode,
            self.power_off,
            Hex::byte(self.hw.power_reduction())
        )?;
        uwrite!(
            w,
            " hooks={}/{}",
            if self.pre_sleep.is_some() { "pre" } else { "-" },
            if self.wake_up.is_some() { "wake" } else { "-" }
        )
    }
}
