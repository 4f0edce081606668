// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_are_valid() {
    let monitoring = MonitoringConfig::default();
    assert!(monitoring.validate().is_ok());
}

#[test]
fn zero_max_capture_lines_is_rejected() {
    let mut monitoring = MonitoringConfig::default();
    monitoring.max_capture_lines = 0;
    assert!(monitoring.validate().is_err());
}

#[test]
fn zero_cadence_is_rejected() {
    let mut monitoring = MonitoringConfig::default();
    monitoring.dispatch_cadence_ms = 0;
    assert!(monitoring.validate().is_err());
}

#[test]
fn production_without_static_dir_is_rejected() {
    let config = Config {
        port: 3001,
        host: "0.0.0.0".into(),
        origin: "http://localhost:3000".into(),
        production: true,
        static_dir: "   ".into(),
        tmux_socket: None,
        log_format: "json".into(),
        log_level: "info".into(),
        monitoring: MonitoringConfig::default(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn duration_helpers_convert_from_millis() {
    let monitoring = MonitoringConfig::default();
    assert_eq!(monitoring.capture_timeout(), Duration::from_millis(5_000));
    assert_eq!(monitoring.completion_minimum(), Duration::from_secs(120));
}
