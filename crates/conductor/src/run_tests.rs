// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn init_tracing_is_safe_to_call_twice() {
    let config = Config {
        port: 0,
        host: "127.0.0.1".into(),
        origin: "http://localhost:3000".into(),
        production: false,
        static_dir: "dist".into(),
        tmux_socket: None,
        log_format: "text".into(),
        log_level: "info".into(),
        monitoring: crate::config::MonitoringConfig::default(),
    };
    init_tracing(&config);
    init_tracing(&config);
}
