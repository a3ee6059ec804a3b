use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

#[macro_export]
macro_rules! log {
    ($level:expr, $span:expr, $($msg:tt)*) => {{
        let span = $crate::tracing::span!($level, $span);
        let _enter = span.enter();

        $crate::tracing::event!($level, $($msg)*)
    }};
}

/// Traffic we send to the server.
#[macro_export]
macro_rules! outgoing {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "outgoing", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::outgoing!(level = TRACE, $($msg)*)
    };
}

/// Traffic the server sends to us.
#[macro_export]
macro_rules! incoming {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "incoming", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::incoming!(level = TRACE, $($msg)*)
    };
}

#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:tt)*) => {
        $crate::log!($crate::tracing::Level::$level, "internal", $($msg)*)
    };

    ($($msg:tt)*) => {
        $crate::internal!(level = TRACE, $($msg)*)
    };
}

/// Installs the global subscriber.
///
/// The level comes from `LOG_LEVEL`, defaulting to TRACE in debug builds and
/// INFO in release builds. Only events from `postbox*` targets are shown.
pub fn init() {
    let default = if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };

    let level = std::env::var("LOG_LEVEL").map_or(default, |level| {
        LevelFilter::from_str(level.as_str()).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    });

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("postbox")
                })),
        )
        .init();
}
