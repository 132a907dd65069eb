use std::env;

const DEFAULT_FREQ_HZ: &str = "16000000";

fn main() {
    println!("cargo:rerun-if-env-changed=AVR_CPU_FREQUENCY_HZ");

    // Pass CPU frequency for baud rate calculations
    let freq = env::var("AVR_CPU_FREQUENCY_HZ").unwrap_or_else(|_| DEFAULT_FREQ_HZ.into());
    if freq.parse::<u32>().is_err() {
        panic!("AVR_CPU_FREQUENCY_HZ must be an integer, got `{freq}`");
    }
    println!("cargo:rustc-env=MCU_FREQ_HZ={freq}");

    // Host builds only run the simulated register file
    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        let board = if env::var("CARGO_FEATURE_ARDUINO").is_ok() {
            "Arduino"
        } else {
            "bare chip"
        };
        println!("cargo:warning=Building for ATmega328P ({board}) at {freq} Hz");
    }
}
