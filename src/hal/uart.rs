use crate::config::{CPU_FREQ_HZ, UART_BAUD};
use avr_device::atmega328p::USART0;
use core::convert::Infallible;

const UCSR0A_MPCM0: u8 = 1 << 0;
const UCSR0A_U2X0: u8 = 1 << 1;
const UCSR0A_UDRE0: u8 = 1 << 5;
const UCSR0A_TXC0: u8 = 1 << 6;
const UCSR0A_RXC0: u8 = 1 << 7;
const UCSR0B_TXEN0: u8 = 1 << 3;
const UCSR0B_RXEN0: u8 = 1 << 4;
// 8N1
const UCSR0C_8BIT: u8 = 0b0000_0110;

// (16_000_000 / (16 * 9600)) - 1 = 103
const UBRR: u16 = (CPU_FREQ_HZ / (16 * UART_BAUD) - 1) as u16;

/// Polled USART0.
///
/// Polled rather than interrupt driven so that nothing is left in a buffer
/// when the core goes to sleep: call [`Usart0::flush`] first.
pub struct Usart0 {
    usart: USART0,
    // A byte went out since the last completed flush
    pending: bool,
}

impl Usart0 {
    pub fn new(usart: USART0) -> Self {
        unsafe {
            usart.ubrr0.write(|w| w.bits(UBRR));
            usart.ucsr0c.write(|w| w.bits(UCSR0C_8BIT));
            usart.ucsr0b.write(|w| w.bits(UCSR0B_TXEN0 | UCSR0B_RXEN0));
        }
        Self {
            usart,
            pending: false,
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.usart.ucsr0a.read().bits() & UCSR0A_UDRE0 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        unsafe {
            // TXC0 is cleared by writing one, FE0/DOR0/UPE0 must be written zero
            self.usart
                .ucsr0a
                .modify(|r, w| w.bits(r.bits() & (UCSR0A_U2X0 | UCSR0A_MPCM0) | UCSR0A_TXC0));
            self.usart.udr0.write(|w| w.bits(byte));
        }
        self.pending = true;
        Ok(())
    }

    pub fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        if self.usart.ucsr0a.read().bits() & UCSR0A_RXC0 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.usart.udr0.read().bits())
    }

    /// Done once the last frame has left the shift register.
    pub fn flush(&mut self) -> nb::Result<(), Infallible> {
        if !self.pending {
            return Ok(());
        }
        let ucsr0a = self.usart.ucsr0a.read().bits();
        if ucsr0a & UCSR0A_UDRE0 == 0 || ucsr0a & UCSR0A_TXC0 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.pending = false;
        Ok(())
    }

    pub fn release(self) -> USART0 {
        self.usart
    }
}

impl ufmt::uWrite for Usart0 {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            nb::block!(self.write_byte(byte))?;
        }
        Ok(())
    }
}
