use crate::hal::power::Hex;
use crate::hal::SleepHardware;
use crate::sleep::SleepController;
use ufmt::{uWrite, uwrite};

/// Line-oriented logging over any `ufmt` writer (USART0 on the chip).
///
/// Write errors are dropped: logging never stops the firmware.
pub struct SerialConsole<W> {
    out: W,
}

impl<W: uWrite> SerialConsole<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.write_str(s).ok();
    }

    pub fn write_line(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    // Print formatted debug info
    pub fn debug(&mut self, msg: &str, val: u8) {
        uwrite!(&mut self.out, "[DBG] {}: 0x{}\r\n", msg, Hex::byte(val)).ok();
    }

    /// Current sleep configuration, one line.
    pub fn sleep_config<H: SleepHardware>(&mut self, sleep: &SleepController<'_, H>) {
        self.write_str("[PWR] ");
        sleep.describe(&mut self.out).ok();
        self.write_str("\r\n");
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn release(self) -> W {
        self.out
    }
}
