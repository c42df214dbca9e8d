//! Board hardware adapters.
//!
//! Wrap the sonar and stepper drivers into the domain-facing
//! [`ProximitySensorPort`] and [`ActuatorPort`]. The drivers handle
//! dual-targeting; these adapters are target-agnostic. Sensor and actuator
//! are deliberately separate objects — the control loop owns each through
//! its own port, mirroring the component boundary.

use crate::app::ports::{ActuatorPort, ProximitySensorPort};
use crate::drivers::sonar::SonarDriver;
use crate::drivers::stepper::StepperDriver;
use crate::error::{ActuationError, SensorError};
use crate::pins;

/// [`ProximitySensorPort`] over the HC-SR04 rangefinder.
pub struct SonarSensorAdapter {
    sonar: SonarDriver,
}

impl SonarSensorAdapter {
    pub fn new() -> Self {
        Self {
            sonar: SonarDriver::new(pins::SONAR_TRIGGER_GPIO, pins::SONAR_ECHO_GPIO),
        }
    }
}

impl ProximitySensorPort for SonarSensorAdapter {
    fn sample(&mut self) -> Result<f32, SensorError> {
        self.sonar.measure_cm()
    }
}

/// [`ActuatorPort`] over the ULN2003 stepper driver.
pub struct GateActuatorAdapter {
    stepper: StepperDriver,
}

impl GateActuatorAdapter {
    pub fn new() -> Self {
        Self {
            stepper: StepperDriver::new(
                pins::MOTOR_IN1_GPIO,
                pins::MOTOR_IN2_GPIO,
                pins::MOTOR_IN3_GPIO,
                pins::MOTOR_IN4_GPIO,
            ),
        }
    }
}

impl ActuatorPort for GateActuatorAdapter {
    fn rotate(&mut self, steps: i32, rpm: f32) -> Result<(), ActuationError> {
        self.stepper.rotate(steps, rpm)
    }
}
