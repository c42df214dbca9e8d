//! GPIO pin assignments for the Gatekeeper controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic rangefinder
// ---------------------------------------------------------------------------

/// Digital output: 10 µs trigger pulse starts a measurement.
pub const SONAR_TRIGGER_GPIO: i32 = 12;
/// Digital input: echo pulse width encodes time-of-flight.
pub const SONAR_ECHO_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// ULN2003 stepper driver (28BYJ-48 geared motor)
// ---------------------------------------------------------------------------

/// Driver input 1 (coil A).
pub const MOTOR_IN1_GPIO: i32 = 27;
/// Driver input 2 (coil B).
pub const MOTOR_IN2_GPIO: i32 = 26;
/// Driver input 3 (coil C).
pub const MOTOR_IN3_GPIO: i32 = 25;
/// Driver input 4 (coil D).
pub const MOTOR_IN4_GPIO: i32 = 33;
