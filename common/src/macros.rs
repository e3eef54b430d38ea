//! Status line macros.
//!
//! Every crate logs through these so the terminal formatter can pick the
//! right symbol. `success!` is an `INFO` event on its own target, the others
//! forward to the matching `tracing` level.

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::__tracing::info!(target: "camprobe::success", $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__tracing::info!($($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__tracing::warn!($($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::__tracing::error!($($arg)+)
    };
}
