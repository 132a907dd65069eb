use avr_device::atmega328p::WDT;

const WDTCSR_WDE: u8 = 1 << 3;
const WDTCSR_WDCE: u8 = 1 << 4;
const WDTCSR_WDIE: u8 = 1 << 6;

/// Watchdog period, as the WDP3 (bit 5) and WDP2:0 bits of WDTCSR.
#[derive(Clone, Copy)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0x00,
    Ms32 = 0x01,
    Ms64 = 0x02,
    Ms125 = 0x03,
    Ms250 = 0x04,
    Ms500 = 0x05,
    Ms1000 = 0x06,
    Ms2000 = 0x07,
    Ms4000 = 0x20,
    Ms8000 = 0x21,
}

/// Interrupt-only mode: the WDT vector fires every `timeout`, no reset.
#[inline]
pub fn start_interrupt(wdt: &WDT, timeout: WatchdogTimeout) {
    avr_device::interrupt::free(|_| {
        feed();
        unsafe {
            // Timed sequence, second write within four cycles
            wdt.wdtcsr.modify(|r, w| w.bits(r.bits() | WDTCSR_WDCE | WDTCSR_WDE));
            wdt.wdtcsr.write(|w| w.bits(WDTCSR_WDIE | timeout as u8));
        }
    });
}

#[inline]
#[allow(unused_unsafe)]
pub fn feed() {
    unsafe {
        avr_device::asm::wdr();
    }
}

/// Needs MCUSR.WDRF cleared first or WDE stays set.
#[inline]
pub fn disable(wdt: &WDT) {
    avr_device::interrupt::free(|_| {
        unsafe {
            // Timed sequence to disable watchdog
            wdt.wdtcsr.modify(|r, w| w.bits(r.bits() | WDTCSR_WDCE | WDTCSR_WDE));
            wdt.wdtcsr.write(|w| w.bits(0x00));
        }
    });
}
