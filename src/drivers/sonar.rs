//! HC-SR04 ultrasonic rangefinder driver.
//!
//! A 10 µs trigger pulse starts a measurement; the echo pin goes high for
//! the ultrasonic time-of-flight. Distance = pulse width / 58 µs per cm.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs the trigger and busy-waits on the echo pin with the
//! high-resolution timer.
//! On host/test: reads simulation statics set via `sim_set_distance_cm` /
//! `sim_set_fail`.

use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Sound travels ~343 m/s; the echo covers the distance twice.
const US_PER_CM_ROUND_TRIP: f32 = 58.0;

/// Longest plausible echo (400 cm range) plus margin.
const ECHO_TIMEOUT_US: u64 = 30_000;

/// Readings outside this window are sensor noise, not obstacles.
const MIN_RANGE_CM: f32 = 2.0;
const MAX_RANGE_CM: f32 = 400.0;

#[cfg(not(target_os = "espidf"))]
static SIM_DISTANCE_CENTI_CM: AtomicU32 = AtomicU32::new(10_000); // 100.00 cm
#[cfg(not(target_os = "espidf"))]
static SIM_FAIL: AtomicBool = AtomicBool::new(false);

/// Set the distance the simulated sensor reports (host targets only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_distance_cm(cm: f32) {
    SIM_DISTANCE_CENTI_CM.store((cm * 100.0) as u32, Ordering::Relaxed);
}

/// Make the simulated sensor fail with a timeout (host targets only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fail(fail: bool) {
    SIM_FAIL.store(fail, Ordering::Relaxed);
}

pub struct SonarDriver {
    trigger_gpio: i32,
    echo_gpio: i32,
}

impl SonarDriver {
    pub fn new(trigger_gpio: i32, echo_gpio: i32) -> Self {
        let driver = Self {
            trigger_gpio,
            echo_gpio,
        };
        driver.configure_pins();
        driver
    }

    #[cfg(target_os = "espidf")]
    fn configure_pins(&self) {
        use esp_idf_sys::{
            gpio_mode_t_GPIO_MODE_INPUT, gpio_mode_t_GPIO_MODE_OUTPUT, gpio_set_direction,
        };
        unsafe {
            let _ = gpio_set_direction(self.trigger_gpio, gpio_mode_t_GPIO_MODE_OUTPUT);
            let _ = gpio_set_direction(self.echo_gpio, gpio_mode_t_GPIO_MODE_INPUT);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn configure_pins(&self) {}

    /// One distance measurement in centimetres.
    pub fn measure_cm(&mut self) -> Result<f32, SensorError> {
        let cm = self.measure_raw_cm()?;
        if !(MIN_RANGE_CM..=MAX_RANGE_CM).contains(&cm) {
            return Err(SensorError::OutOfRange);
        }
        Ok(cm)
    }

    #[cfg(target_os = "espidf")]
    fn measure_raw_cm(&mut self) -> Result<f32, SensorError> {
        use esp_idf_sys::{esp_rom_delay_us, esp_timer_get_time, gpio_get_level, gpio_set_level};

        unsafe {
            // 10 µs trigger pulse.
            gpio_set_level(self.trigger_gpio, 1);
            esp_rom_delay_us(10);
            gpio_set_level(self.trigger_gpio, 0);
        }

        let wait_for_level = |level: i32| -> Result<i64, SensorError> {
            let start = unsafe { esp_timer_get_time() };
            loop {
                if unsafe { gpio_get_level(self.echo_gpio) } == level {
                    return Ok(unsafe { esp_timer_get_time() });
                }
                if unsafe { esp_timer_get_time() } - start > ECHO_TIMEOUT_US as i64 {
                    return Err(SensorError::Timeout);
                }
            }
        };

        let rise = wait_for_level(1)?;
        let fall = wait_for_level(0)?;
        Ok((fall - rise) as f32 / US_PER_CM_ROUND_TRIP)
    }

    #[cfg(not(target_os = "espidf"))]
    fn measure_raw_cm(&mut self) -> Result<f32, SensorError> {
        let _ = (self.trigger_gpio, self.echo_gpio);
        if SIM_FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::Timeout);
        }
        Ok(SIM_DISTANCE_CENTI_CM.load(Ordering::Relaxed) as f32 / 100.0)
    }
}
