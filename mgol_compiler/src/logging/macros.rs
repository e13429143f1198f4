//! Logging macros
//!
//! Every macro takes optional `"key" => value` pairs, where `value` is any
//! `Display`. Nothing is formatted unless the global logger would keep the
//! event, so the macros cost one level check when logging is off.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),*) => {
        vec![$(($key, ($value).to_string())),*]
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_emit {
    ($level:ident, $event:expr, $($key:expr => $value:expr),*) => {
        if $crate::logging::enabled($crate::logging::LogLevel::$level) {
            $crate::logging::emit($event, $crate::__log_context!($($key => $value),*))
        }
    };
}

/// Error with a `Code`, optionally located with `span = ...`
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_emit!(Error,
            $crate::logging::LogEvent::error($code, $message).with_span($span),
            $($key => $value),*)
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_emit!(Error, $crate::logging::LogEvent::error($code, $message), $($key => $value),*)
    };
}

/// Info-level milestone carrying a success code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_emit!(Info, $crate::logging::LogEvent::success($code, $message), $($key => $value),*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_emit!(Info, $crate::logging::LogEvent::info($message), $($key => $value),*)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_emit!(Warning, $crate::logging::LogEvent::warning($message), $($key => $value),*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_emit!(Debug, $crate::logging::LogEvent::debug($message), $($key => $value),*)
    };
}

/// `log_success!` with the elapsed time as `duration_ms`
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::log_success!($code, $message,
            "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
            $(, $key => $value)*
        )
    };
}
