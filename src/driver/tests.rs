use super::{
    cmd::{EchoMode, RotationDirection},
    DriverError, Rotator, RotorConfig,
};
use rotator_stepper_driver_test::Interface;
use std::time::Duration;

fn connected(interface: &Interface) -> Rotator<Interface> {
    connected_with(interface, RotorConfig::default())
}

fn connected_with(interface: &Interface, cfg: RotorConfig) -> Rotator<Interface> {
    let mut rotator = Rotator::new(cfg);
    rotator.connect(interface.clone()).unwrap();
    rotator
}

// config with waits short enough for tests
fn fast_cfg() -> RotorConfig {
    RotorConfig {
        command_settle: Duration::from_millis(1),
        reset_settle: Duration::from_millis(1),
        poll_interval: Duration::from_millis(1),
        poll_timeout: Duration::from_millis(20),
        ..RotorConfig::default()
    }
}

#[test]
fn set_direction_emits_wire_command() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"H+\r\n");
    rotator
        .set_direction(RotationDirection::Clockwise)
        .unwrap();
    assert_eq!(rotator.direction(), RotationDirection::Clockwise);
    interface.add_write(b"H-\r\n");
    rotator
        .set_direction(RotationDirection::CounterClockwise)
        .unwrap();
    assert_eq!(rotator.direction(), RotationDirection::CounterClockwise);
    assert!(interface.is_empty());
}

#[test]
fn set_degrees_per_step_scales_to_counts() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"D2000\r\n");
    rotator.set_degrees_per_step(2.0).unwrap();
    assert_eq!(rotator.degrees_per_step(), 2.0);
    assert!(interface.is_empty());
}

#[test]
fn set_degrees_per_step_applies_gearbox_ratio() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    rotator.set_gearbox_ratio(0.5).unwrap();
    interface.add_write(b"D1000\r\n");
    rotator.set_degrees_per_step(2.0).unwrap();
    assert!(interface.is_empty());
}

#[test]
fn velocity_and_acceleration_round_to_integers() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"V10\r\n");
    rotator.set_velocity(10.2).unwrap();
    assert_eq!(rotator.velocity(), 10.2);
    interface.add_write(b"A5\r\n");
    rotator.set_acceleration(5.0).unwrap();
    assert_eq!(rotator.acceleration(), 5.0);
    assert!(interface.is_empty());
}

#[test]
fn invalid_arguments_rejected_before_send() {
    let interface = Interface::new();
    let mut rotator = connected(&interface);
    // nothing queued on the interface, a send would panic the mock
    assert!(matches!(
        rotator.set_velocity(0.0),
        Err(DriverError::InvalidArgument)
    ));
    assert!(matches!(
        rotator.set_velocity(-3.0),
        Err(DriverError::InvalidArgument)
    ));
    assert!(matches!(
        rotator.set_acceleration(f64::NAN),
        Err(DriverError::InvalidArgument)
    ));
    assert!(matches!(
        rotator.set_degrees_per_step(0.0),
        Err(DriverError::InvalidArgument)
    ));
    assert!(matches!(
        rotator.set_degrees_per_step(f64::INFINITY),
        Err(DriverError::InvalidArgument)
    ));
    assert_eq!(rotator.velocity(), 10.0);
    assert_eq!(rotator.acceleration(), 10.0);
    assert_eq!(rotator.degrees_per_step(), 10.0);
}

#[test]
fn gearbox_ratio_range_is_enforced() {
    let interface = Interface::new();
    let mut rotator = connected(&interface);
    for bad in [0.0, -0.5, 1.01, f64::NAN] {
        assert!(matches!(
            rotator.set_gearbox_ratio(bad),
            Err(DriverError::InvalidArgument)
        ));
        assert_eq!(rotator.gearbox_ratio(), 1.0);
    }
    rotator.set_gearbox_ratio(0.25).unwrap();
    assert_eq!(rotator.gearbox_ratio(), 0.25);
}

#[test]
fn safety_limit_commands_are_addressed() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    assert!(rotator.safety_limits_enabled());
    interface.add_write(b"1LD3\r\n");
    rotator.disable_safety_limits().unwrap();
    assert!(!rotator.safety_limits_enabled());
    interface.add_write(b"1LD0\r\n");
    rotator.enable_safety_limits().unwrap();
    assert!(rotator.safety_limits_enabled());
    assert!(interface.is_empty());
}

#[test]
fn controller_address_prefixes_subsequent_commands() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    rotator.set_controller_address(7);
    assert_eq!(rotator.controller_address(), 7);
    interface.add_write(b"7PZ\r\n");
    rotator.reset_position_register().unwrap();
    assert!(interface.is_empty());
}

#[test]
fn echo_mode_commands() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"1EM1\r\n");
    rotator.set_echo_mode(EchoMode::On).unwrap();
    interface.add_write(b"1EM0\r\n");
    rotator.set_echo_mode(EchoMode::Off).unwrap();
    assert!(interface.is_empty());
}

#[test]
fn reset_system_sends_and_settles() {
    let mut interface = Interface::new();
    let mut rotator = connected_with(&interface, fast_cfg());
    interface.add_write(b"1Z\r\n");
    rotator.reset_system().unwrap();
    assert!(interface.is_empty());
}

#[test]
fn activate_step_tracks_angle_per_direction() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"H+\r\n");
    rotator
        .set_direction(RotationDirection::Clockwise)
        .unwrap();
    interface.add_write(b"G\r\n");
    rotator.activate_step().unwrap();
    interface.add_write(b"G\r\n");
    rotator.activate_step().unwrap();
    assert_eq!(rotator.current_angle(), 20.0);

    interface.add_write(b"H-\r\n");
    rotator
        .set_direction(RotationDirection::CounterClockwise)
        .unwrap();
    interface.add_write(b"G\r\n");
    rotator.activate_step().unwrap();
    assert_eq!(rotator.current_angle(), 10.0);
    assert!(interface.is_empty());
}

#[test]
fn get_absolute_position_queries_and_converts() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    rotator.set_gearbox_ratio(0.5).unwrap();
    interface.add_write(b"1PR\r\n");
    interface.add_write(b"1LF\r\n");
    interface.add_read(b"#4000\r\n");
    let position = rotator.get_absolute_position().unwrap();
    assert_eq!(position, 8.0);
    // informational only
    assert_eq!(rotator.current_angle(), 0.0);
    assert!(interface.is_empty());
}

#[test]
fn malformed_position_response_is_a_parse_error() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"1PR\r\n");
    interface.add_write(b"1LF\r\n");
    interface.add_read(b"#one thousand\r\n");
    assert!(matches!(
        rotator.get_absolute_position(),
        Err(DriverError::ParsingError(_))
    ));
    assert_eq!(rotator.current_angle(), 0.0);
    assert!(interface.is_empty());
}

#[test]
fn disconnected_operations_fail_and_leave_state() {
    let mut rotator: Rotator<Interface> = Rotator::new(RotorConfig::default());
    assert!(!rotator.is_connected());
    assert!(matches!(
        rotator.set_direction(RotationDirection::CounterClockwise),
        Err(DriverError::NotConnected)
    ));
    assert!(matches!(
        rotator.set_velocity(5.0),
        Err(DriverError::NotConnected)
    ));
    assert!(matches!(
        rotator.activate_step(),
        Err(DriverError::NotConnected)
    ));
    assert!(matches!(
        rotator.get_absolute_position(),
        Err(DriverError::NotConnected)
    ));
    assert!(matches!(
        rotator.disconnect(),
        Err(DriverError::NotConnected)
    ));
    assert_eq!(rotator.direction(), RotationDirection::Clockwise);
    assert_eq!(rotator.velocity(), 10.0);
    assert_eq!(rotator.current_angle(), 0.0);
}

#[test]
fn connect_twice_is_rejected() {
    let interface = Interface::new();
    let mut rotator = connected(&interface);
    assert!(matches!(
        rotator.connect(interface.clone()),
        Err(DriverError::AlreadyConnected)
    ));
    rotator.disconnect().unwrap();
    assert!(!rotator.is_connected());
    rotator.connect(interface).unwrap();
}

#[test]
fn emergency_stop_sends_halt_then_kill() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"MN\r\n");
    interface.add_write(b"K\r\n");
    rotator.emergency_stop().unwrap();
    assert!(interface.is_empty());
}

#[test]
fn stop_sends_halt_then_soft_stop() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"MN\r\n");
    interface.add_write(b"S\r\n");
    rotator.stop().unwrap();
    assert!(interface.is_empty());
}

#[test]
fn go_to_home_reverses_and_resets_angle() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"G\r\n");
    rotator.activate_step().unwrap();
    assert_eq!(rotator.current_angle(), 10.0);

    interface.add_write(b"H-\r\n");
    interface.add_write(b"1LD3\r\n");
    interface.add_write(b"GH-2\r\n");
    rotator.go_to_home().unwrap();
    assert_eq!(rotator.direction(), RotationDirection::CounterClockwise);
    assert!(!rotator.safety_limits_enabled());
    assert_eq!(rotator.current_angle(), 0.0);
    assert!(interface.is_empty());
}

#[test]
fn step_and_wait_estimated_blocks_for_the_estimate() {
    let mut interface = Interface::new();
    let mut rotator = connected(&interface);
    interface.add_write(b"D10\r\n");
    rotator.set_degrees_per_step(0.01).unwrap();
    interface.add_write(b"V100\r\n");
    rotator.set_velocity(100.0).unwrap();
    interface.add_write(b"G\r\n");
    let started = std::time::Instant::now();
    rotator.step_and_wait_estimated().unwrap();
    // 0.01 / 100 = 100µs, just check it came back quickly and stepped
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(rotator.current_angle(), 0.01);
    assert!(interface.is_empty());
}

fn queue_position_exchange(interface: &mut Interface, response: &[u8]) {
    interface.add_write(b"1PR\r\n");
    interface.add_write(b"1LF\r\n");
    interface.add_read(response);
}

#[test]
fn step_and_wait_until_reached_polls_to_target() {
    let mut interface = Interface::new();
    let mut rotator = connected_with(&interface, fast_cfg());
    // initial position, then the step, then two polls until the register
    // reports initial + 10 * 1000 counts
    queue_position_exchange(&mut interface, b"#0\r\n");
    interface.add_write(b"G\r\n");
    queue_position_exchange(&mut interface, b"#5000\r\n");
    queue_position_exchange(&mut interface, b"#10000\r\n");
    rotator.step_and_wait_until_reached().unwrap();
    assert_eq!(rotator.current_angle(), 10.0);
    assert!(interface.is_empty());
}

#[test]
fn step_and_wait_until_reached_respects_direction() {
    let mut interface = Interface::new();
    let mut rotator = connected_with(&interface, fast_cfg());
    interface.add_write(b"H-\r\n");
    rotator
        .set_direction(RotationDirection::CounterClockwise)
        .unwrap();
    queue_position_exchange(&mut interface, b"#10000\r\n");
    interface.add_write(b"G\r\n");
    queue_position_exchange(&mut interface, b"#0\r\n");
    rotator.step_and_wait_until_reached().unwrap();
    assert_eq!(rotator.current_angle(), -10.0);
    assert!(interface.is_empty());
}

#[test]
fn step_and_wait_until_reached_times_out() {
    let mut interface = Interface::new();
    let mut rotator = connected_with(&interface, fast_cfg());
    queue_position_exchange(&mut interface, b"#0\r\n");
    interface.add_write(b"G\r\n");
    // the register never moves; a 20ms timeout at 1ms interval polls at
    // most 21 times
    for _ in 0..21 {
        queue_position_exchange(&mut interface, b"#0\r\n");
    }
    assert!(matches!(
        rotator.step_and_wait_until_reached(),
        Err(DriverError::TimedOut { target: 10000, .. })
    ));
}

#[test]
fn position_tolerance_widens_the_match() {
    let mut interface = Interface::new();
    let cfg = RotorConfig {
        position_tolerance: 5,
        ..fast_cfg()
    };
    let mut rotator = connected_with(&interface, cfg);
    queue_position_exchange(&mut interface, b"#0\r\n");
    interface.add_write(b"G\r\n");
    queue_position_exchange(&mut interface, b"#9997\r\n");
    rotator.step_and_wait_until_reached().unwrap();
    assert!(interface.is_empty());
}
