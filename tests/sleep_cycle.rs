use avr_sleep::hal::sim::{
    Event, Simulator, ACSR_ACD, MCUCR_BODS, MCUCR_BODSE, MCUSR_PORF, MCUSR_WDRF, SMCR_SE,
    SMCR_SM_MASK, WDTCSR_WDE,
};
use avr_sleep::hal::{SleepHardware, SREG_I};
use avr_sleep::{PowerOff, SleepController, SleepMode, TargetCaps};
use core::cell::Cell;

fn pos(sim: &Simulator, event: Event) -> usize {
    sim.position(event)
        .unwrap_or_else(|| panic!("{event:?} missing from {:?}", sim.trace()))
}

fn sleep_pos(sim: &Simulator) -> usize {
    sim.sleep_position().expect("no sleep instruction")
}

#[test]
fn constrained_target_commits_requested_mode_or_fallback() {
    for mode in SleepMode::ALL {
        let sim = Simulator::new();
        let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
        sleep.configure(mode, PowerOff::NONE);

        let expected = match mode {
            SleepMode::PowerSave => SleepMode::PowerDown,
            SleepMode::ExtendedStandby => SleepMode::Standby,
            other => other,
        };
        assert_eq!(sleep.mode(), expected);
        assert_eq!(sleep.committed_mode(), Ok(expected));
        assert_eq!(sim.smcr() & SMCR_SM_MASK, expected.smcr_bits());
    }
}

#[test]
fn unconstrained_target_commits_requested_mode() {
    for mode in SleepMode::ALL {
        let sim = Simulator::new();
        let mut sleep = SleepController::new(sim.hardware(), TargetCaps::BARE_CHIP);
        sleep.configure(mode, PowerOff::NONE);
        assert_eq!(sleep.committed_mode(), Ok(mode));
    }
}

#[test]
fn configure_is_idempotent() {
    let mask = PowerOff::TWI | PowerOff::AC | PowerOff::WDT;

    let once = Simulator::new();
    let mut a = SleepController::new(once.hardware(), TargetCaps::ARDUINO);
    a.configure(SleepMode::ExtendedStandby, mask);

    let twice = Simulator::new();
    let mut b = SleepController::new(twice.hardware(), TargetCaps::ARDUINO);
    b.configure(SleepMode::ExtendedStandby, mask);
    b.configure(SleepMode::ExtendedStandby, mask);

    assert_eq!(once.smcr(), twice.smcr());
    assert_eq!(once.prr(), twice.prr());
    assert_eq!(a.mode(), b.mode());
    assert_eq!(a.power_off(), b.power_off());
}

#[test]
fn prr_restored_before_wake_hook() {
    let sim = Simulator::new();
    sim.set_prr(0x21);
    let seen = Cell::new(None);
    let wake = || seen.set(Some(sim.prr()));

    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::PowerDown, PowerOff::EVERYTHING);
    sleep.attach_wake_up(&wake);
    sleep.sleep();

    assert_eq!(seen.get(), Some(0x21));
    assert_eq!(sim.prr(), 0x21);

    // Mask applied for the duration of the sleep only
    let applied = pos(&sim, Event::PrrWrite(0xEF));
    let restored = pos(&sim, Event::PrrWrite(0x21));
    assert!(applied < sleep_pos(&sim));
    assert!(restored > sleep_pos(&sim));
}

#[test]
fn watchdog_acknowledged_before_disable() {
    let sim = Simulator::new();
    sim.set_mcusr(MCUSR_WDRF | MCUSR_PORF);
    sim.set_wdtcsr(WDTCSR_WDE | 0x06);

    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::PowerDown, PowerOff::WDT);
    sleep.sleep();

    let reset = pos(&sim, Event::WatchdogReset);
    let flag = pos(&sim, Event::WatchdogFlagClear);
    let disable = pos(&sim, Event::WatchdogDisable);
    assert!(reset < flag && flag < disable);
    assert!(disable < pos(&sim, Event::InterruptsDisabled));

    assert_eq!(sim.watchdog_resets(), 1);
    assert_eq!(sim.wdtcsr(), 0);
    // Only WDRF is cleared, other reset causes are kept
    assert_eq!(sim.mcusr(), MCUSR_PORF);
}

#[test]
fn bod_disable_abuts_sleep_instruction() {
    let sim = Simulator::new();
    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::PowerDown, PowerOff::BOD);
    sleep.sleep();

    let cli = pos(&sim, Event::InterruptsDisabled);
    let se = pos(&sim, Event::SleepEnable);
    let bod = pos(&sim, Event::BodDisable);
    let sei = pos(&sim, Event::InterruptsEnabled);
    let slp = sleep_pos(&sim);

    assert!(cli < se);
    assert!(se < bod && bod < slp);
    assert!(slp - bod - 1 <= 1, "too many steps between BOD disable and sleep");
    assert!(bod < sei && sei < slp);

    // BODS drops back on its own, the BOD is only off while asleep
    assert_eq!(sim.mcucr() & (MCUCR_BODS | MCUCR_BODSE), 0);
}

#[test]
fn hooks_run_once_outside_interrupt_mask() {
    let sim = Simulator::new();
    let pre = || sim.record(Event::PreSleepHook);
    let wake = || sim.record(Event::WakeHook);

    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::Idle, PowerOff::AC | PowerOff::WDT | PowerOff::BOD);
    sleep.attach_pre_sleep(&pre);
    sleep.attach_wake_up(&wake);
    sleep.sleep();

    assert_eq!(sim.count(Event::PreSleepHook), 1);
    assert_eq!(sim.count(Event::WakeHook), 1);

    // Pre-sleep hook after the synthetic peripherals are off
    assert!(pos(&sim, Event::WatchdogDisable) < pos(&sim, Event::PreSleepHook));
    assert!(pos(&sim, Event::PreSleepHook) < pos(&sim, Event::InterruptsDisabled));
    assert!(pos(&sim, Event::InterruptsRestored(true)) < pos(&sim, Event::WakeHook));
    assert_eq!(sim.trace().last(), Some(&Event::WakeHook));
}

#[test]
fn timer1_and_adc_in_power_save_on_arduino() {
    let sim = Simulator::new();
    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::PowerSave, PowerOff::TIMER1 | PowerOff::ADC);
    assert_eq!(sleep.committed_mode(), Ok(SleepMode::PowerDown));

    sleep.sleep();
    assert_eq!(sim.count(Event::PrrWrite(0x09)), 1);
    assert_eq!(sim.position(Event::AnalogComparatorOff), None);
    assert_eq!(sim.position(Event::WatchdogReset), None);
    assert_eq!(sim.position(Event::WatchdogFlagClear), None);
    assert_eq!(sim.position(Event::WatchdogDisable), None);
    assert_eq!(sim.position(Event::BodDisable), None);
}

#[test]
fn bod_and_wdt_leave_prr_alone() {
    for mode in SleepMode::ALL {
        let sim = Simulator::new();
        sim.set_prr(0x80);
        let mut sleep = SleepController::new(sim.hardware(), TargetCaps::BARE_CHIP);
        sleep.configure(mode, PowerOff::BOD | PowerOff::WDT);
        sleep.sleep();

        // Only the mask's PRR byte is written, synthetic bits never reach PRR
        assert_eq!(sim.count(Event::PrrWrite(0x00)), 1);
        assert_eq!(sim.prr(), 0x80);
        assert!(sim.position(Event::WatchdogDisable).is_some());

        let bod = pos(&sim, Event::BodDisable);
        let slp = sleep_pos(&sim);
        assert!(bod > pos(&sim, Event::SleepEnable));
        assert!(slp - bod - 1 <= 1);
    }
}

#[test]
fn sleeps_armed_with_interrupts_enabled() {
    let sim = Simulator::new();
    // Caller had interrupts masked
    sim.set_sreg(0x02);

    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::Standby, PowerOff::NONE);
    sleep.sleep();

    assert_eq!(
        sim.trace()[sleep_pos(&sim)],
        Event::Sleep {
            armed: true,
            interrupts: true
        }
    );
    assert_eq!(sim.smcr() & SMCR_SE, 0);
    assert_eq!(sim.sreg(), 0x02);
    assert_eq!(sim.sreg() & SREG_I, 0);
    assert!(sim.position(Event::InterruptsRestored(false)).is_some());
}

#[test]
fn analog_comparator_stays_off_after_wake() {
    let sim = Simulator::new();
    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::AdcNoiseReduction, PowerOff::AC);
    sleep.sleep();

    assert_eq!(sim.acsr() & ACSR_ACD, ACSR_ACD);
    assert!(pos(&sim, Event::AnalogComparatorOff) < pos(&sim, Event::InterruptsDisabled));
}

#[test]
fn configuration_persists_across_cycles() {
    let sim = Simulator::new();
    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.configure(SleepMode::PowerDown, PowerOff::SPI | PowerOff::BOD);
    sim.clear_trace();

    sleep.sleep();
    let first = sim.trace();
    sim.clear_trace();
    sleep.sleep();

    assert_eq!(sim.trace(), first);
    assert_eq!(sleep.mode(), SleepMode::PowerDown);
    assert_eq!(sleep.power_off(), PowerOff::SPI | PowerOff::BOD);
    assert_eq!(sim.hardware().sleep_mode_field(), SleepMode::PowerDown as u8);
}

#[test]
fn no_hooks_attached() {
    let sim = Simulator::new();
    let mut sleep = SleepController::new(sim.hardware(), TargetCaps::ARDUINO);
    sleep.sleep();

    assert_eq!(sim.count(Event::PreSleepHook), 0);
    assert_eq!(sim.count(Event::WakeHook), 0);
    assert_eq!(sim.trace().last(), Some(&Event::InterruptsRestored(true)));
}
