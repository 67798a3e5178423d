//! Conditional tracing macros (zero-cost when feature disabled).
//!
//! With the `tracing` feature the macros forward to the `tracing` crate;
//! without it they compile to nothing. Fields use the `key = value` form and
//! the message must be a string literal.

/// Create an info-level span for a major operation.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emit an info-level event.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!($($key = $value,)* $msg)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        let _ = ($(&$value,)*);
    };
}

/// Emit a debug-level event.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!($($key = $value,)* $msg)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        let _ = ($(&$value,)*);
    };
}

/// Emit a warn-level event.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!($($key = $value,)* $msg)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        let _ = ($(&$value,)*);
    };
}

pub(crate) use trace_debug;
pub(crate) use trace_event;
pub(crate) use trace_span;
pub(crate) use trace_warn;

/// A no-op span guard used when tracing is disabled.
///
/// Lets `let _guard = trace_span!(...).entered();` compile without
/// conditional compilation at call sites.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Returns self, mimicking `Span::entered()`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
