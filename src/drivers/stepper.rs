//! ULN2003 half-step driver for the 28BYJ-48 geared stepper.
//!
//! Eight-phase half-step sequence; 4096 half-steps per output-shaft
//! revolution through the 64:1 gearbox. `rotate` blocks until the stroke
//! completes — there is deliberately no interruption point, matching the
//! actuation contract of [`ActuatorPort`](crate::app::ports::ActuatorPort).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the coil pattern to the four driver GPIOs with a
//! per-step delay derived from the commanded RPM.
//! On host/test: accumulates commanded steps in a simulation counter and
//! skips the delays, so tests run at full speed.

use log::debug;

use crate::error::ActuationError;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI64, Ordering};

/// Half-steps per output revolution (64 × 64:1 gearbox, half-stepping).
const HALF_STEPS_PER_REV: f32 = 4096.0;

/// Coil energisation pattern, one row per half-step phase.
const HALF_STEP_SEQUENCE: [[bool; 4]; 8] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

#[cfg(not(target_os = "espidf"))]
static SIM_NET_STEPS: AtomicI64 = AtomicI64::new(0);

/// Net signed steps commanded so far (host targets only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_net_steps() -> i64 {
    SIM_NET_STEPS.load(Ordering::Relaxed)
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_reset_steps() {
    SIM_NET_STEPS.store(0, Ordering::Relaxed);
}

pub struct StepperDriver {
    pins: [i32; 4],
    phase: usize,
}

impl StepperDriver {
    pub fn new(in1: i32, in2: i32, in3: i32, in4: i32) -> Self {
        let driver = Self {
            pins: [in1, in2, in3, in4],
            phase: 0,
        };
        driver.configure_pins();
        driver
    }

    #[cfg(target_os = "espidf")]
    fn configure_pins(&self) {
        use esp_idf_sys::{gpio_mode_t_GPIO_MODE_OUTPUT, gpio_set_direction};
        for pin in self.pins {
            unsafe {
                let _ = gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_OUTPUT);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure_pins(&self) {}

    /// Rotate by `steps` half-steps (sign = direction) at `rpm`. Blocking.
    pub fn rotate(&mut self, steps: i32, rpm: f32) -> Result<(), ActuationError> {
        if rpm <= 0.0 {
            return Err(ActuationError::InvalidCommand);
        }
        if steps == 0 {
            return Ok(());
        }

        let step_delay_us = (60_000_000.0 / (rpm * HALF_STEPS_PER_REV)) as u64;
        debug!(
            "STEP | {} half-steps at {} RPM ({} µs/step)",
            steps, rpm, step_delay_us
        );

        let forward = steps > 0;
        for _ in 0..steps.unsigned_abs() {
            self.phase = if forward {
                (self.phase + 1) % HALF_STEP_SEQUENCE.len()
            } else {
                (self.phase + HALF_STEP_SEQUENCE.len() - 1) % HALF_STEP_SEQUENCE.len()
            };
            self.write_phase(step_delay_us)?;
        }

        self.release_coils();

        #[cfg(not(target_os = "espidf"))]
        SIM_NET_STEPS.fetch_add(steps.into(), Ordering::Relaxed);

        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn write_phase(&self, step_delay_us: u64) -> Result<(), ActuationError> {
        use esp_idf_sys::{esp_rom_delay_us, gpio_set_level};

        let pattern = HALF_STEP_SEQUENCE[self.phase];
        for (pin, on) in self.pins.iter().zip(pattern) {
            let ret = unsafe { gpio_set_level(*pin, u32::from(on)) };
            if ret != esp_idf_sys::ESP_OK {
                return Err(ActuationError::GpioWriteFailed);
            }
        }
        unsafe { esp_rom_delay_us(step_delay_us as u32) };
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_phase(&self, _step_delay_us: u64) -> Result<(), ActuationError> {
        let _ = self.pins;
        Ok(())
    }

    /// De-energise all coils after a stroke; holding torque is not needed
    /// and the motor heats up otherwise.
    #[cfg(target_os = "espidf")]
    fn release_coils(&self) {
        use esp_idf_sys::gpio_set_level;
        for pin in self.pins {
            unsafe {
                let _ = gpio_set_level(pin, 0);
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn release_coils(&self) {}
}
