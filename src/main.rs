#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use avr_device::atmega328p::Peripherals;
    use avr_sleep::config::AWAKE_PASSES;
    use avr_sleep::drivers::{SerialConsole, StatusPin};
    use avr_sleep::hal::gpio::board::Led;
    use avr_sleep::hal::{Atmega328p, Input, Pin, SleepHardware, Usart0, WatchdogTimeout};
    use avr_sleep::{PowerOff, SleepController, SleepMode, TargetCaps};

    #[avr_device::entry]
    fn main() -> ! {
        let dp = Peripherals::take().unwrap();

        let mut console = SerialConsole::new(Usart0::new(dp.USART0));
        let led: Led = unsafe { Pin::<5, Input>::steal() }.into_output();
        let status = StatusPin::new(led);
        let pre_sleep = || status.asleep();
        let wake_up = || status.awake();

        let mut sleep = SleepController::new(Atmega328p::new(dp.CPU, dp.AC, dp.WDT), TargetCaps::BUILD);
        sleep.configure(
            SleepMode::PowerSave,
            PowerOff::ADC | PowerOff::SPI | PowerOff::TWI | PowerOff::TIMER1 | PowerOff::AC | PowerOff::BOD,
        );
        sleep.attach_pre_sleep(&pre_sleep);
        sleep.attach_wake_up(&wake_up);
        sleep.hardware_mut().start_wake_timer(WatchdogTimeout::Ms8000);

        // Enable interrupts globally
        unsafe { avr_device::interrupt::enable() };
        status.awake();

        console.write_line("ATmega328P sleep demo v0.1.0");
        console.sleep_config(&sleep);

        let mut cycles = 0u8;
        loop {
            for _ in 0..AWAKE_PASSES {
                if let Ok(byte) = console.writer_mut().read_byte() {
                    console.debug("RX", byte);
                }
            }

            console.debug("Sleep", cycles);
            nb::block!(console.writer_mut().flush()).ok();
            sleep.sleep();

            cycles = cycles.wrapping_add(1);
            console.debug("Wake PRR", sleep.hardware().power_reduction());
        }
    }

    #[avr_device::interrupt(atmega328p)]
    fn WDT() {
        // Wake-up only
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
