use core::cell::RefCell;
use embedded_hal::digital::v2::OutputPin;

/// Output pin that shows whether the core is awake.
///
/// Meant to be driven from the sleep hooks: `asleep` as the pre-sleep hook,
/// `awake` as the wake-up hook. Pin errors are ignored.
pub struct StatusPin<P> {
    pin: RefCell<P>,
}

impl<P: OutputPin> StatusPin<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin: RefCell::new(pin),
        }
    }

    /// Drive low.
    pub fn asleep(&self) {
        self.pin.borrow_mut().set_low().ok();
    }

    /// Drive high.
    pub fn awake(&self) {
        self.pin.borrow_mut().set_high().ok();
    }

    pub fn release(self) -> P {
        self.pin.into_inner()
    }
}
