// SPDX-License-Identifier: MIT OR Apache-2.0

//! Format-string entry points.
//!
//! Each macro targets the [default tracer](crate::default_tracer) unless the
//! first argument is `tracer: <expr>,`, in which case it targets that tracer
//! (anything that derefs to [`Tracer`](crate::Tracer), such as `&Tracer` or
//! `Arc<Tracer>`).
//!
//! Besides file and line, the macros record the enclosing function in the
//! line's [`Source`](crate::callsite::Source).
//!
//! ```rust
//! use tracemark::{MemorySink, Tracer, TracerConfig, here, msg, objs};
//!
//! let sink = MemorySink::new();
//! let tracer = Tracer::with_writer(TracerConfig::immediate(), sink.clone());
//!
//! let attempts = 3;
//! msg!(tracer: tracer, "retrying after {} attempts", attempts);
//! here!(tracer: tracer);
//! objs!(tracer: tracer, attempts, "label");
//!
//! let output = sink.drain();
//! let lines: Vec<&str> = output.lines().collect();
//! assert!(lines[0].ends_with("- retrying after 3 attempts"));
//! assert!(!lines[1].contains("- "));
//! assert!(lines[2].ends_with(r#"- [0] 3, [1] "label""#));
//! ```

use crate::callsite::Source;
use crate::tracer::Tracer;

/// Expands to the path of the enclosing function.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f").unwrap_or(name)
    }};
}

/// Emits a formatted message.
///
/// ```rust
/// let user = "alice";
/// tracemark::msg!("logged in as {}", user);
/// ```
#[macro_export]
macro_rules! msg {
    (tracer: $tracer:expr, $($arg:tt)+) => {
        $crate::hidden::emit(&$tracer, $crate::__function_name!(), ::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::hidden::emit(
            &$crate::default_tracer(),
            $crate::__function_name!(),
            ::std::format!($($arg)+),
        )
    };
}

/// Emits a "reached here" marker.
#[macro_export]
macro_rules! here {
    (tracer: $tracer:expr $(,)?) => {
        $crate::hidden::emit(&$tracer, $crate::__function_name!(), ::std::string::String::new())
    };
    () => {
        $crate::hidden::emit(
            &$crate::default_tracer(),
            $crate::__function_name!(),
            ::std::string::String::new(),
        )
    };
}

/// Emits one line listing each argument's index and `Debug` representation.
///
/// ```rust
/// #[derive(Debug)]
/// struct Job { id: u32, name: &'static str }
///
/// let job = Job { id: 7, name: "reindex" };
/// tracemark::objs!(job, 42);
/// ```
#[macro_export]
macro_rules! objs {
    (tracer: $tracer:expr $(, $value:expr)* $(,)?) => {
        $crate::hidden::emit(
            &$tracer,
            $crate::__function_name!(),
            $crate::line::describe_values(&[$(&$value as &dyn ::std::fmt::Debug),*]),
        )
    };
    ($($value:expr),* $(,)?) => {
        $crate::hidden::emit(
            &$crate::default_tracer(),
            $crate::__function_name!(),
            $crate::line::describe_values(&[$(&$value as &dyn ::std::fmt::Debug),*]),
        )
    };
}

/// Called by the macros; records the macro's location and function.
#[track_caller]
pub fn emit(tracer: &Tracer, function: &str, message: String) {
    tracer.emit(Source::caller().with_function(function), message);
}
