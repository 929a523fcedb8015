// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Component name attached to every diagnostic line from the library.
pub const LOG_TARGET: &str = "NativeProcessor";

static INIT: Once = Once::new();

/// Installs the process-wide tracing subscriber.
///
/// Log lines go to the systemd journal, tagged with [`LOG_TARGET`], when the
/// journal socket is reachable and to stderr otherwise. `RUST_LOG` overrides
/// the default level (`debug` when `verbose`, `info` otherwise).
///
/// Only the first call has any effect, and a subscriber installed by the host
/// beforehand is left in place.
pub fn init(verbose: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if verbose { "debug" } else { "info" })
        });

        let journald = tracing_journald::layer()
            .ok()
            .map(|layer| layer.with_syslog_identifier(LOG_TARGET.to_string()));
        let stderr = journald.is_none().then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
        });

        _ = tracing_subscriber::registry()
            .with(filter)
            .with(journald)
            .with(stderr)
            .try_init();
    });
}
