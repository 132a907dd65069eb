pub mod serial_console;
pub mod status_pin;

pub use serial_console::SerialConsole;
pub use status_pin::StatusPin;
