// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovering where a trace line came from.
//!
//! Every public entry point in tracemark is `#[track_caller]`, so the location
//! reported by [`Location::caller`] is the user's call no matter how many
//! forwarding layers sit between the macro or free function and the tracer.
//! [`Source::caller`] is the resolver used for every emitted line.
//!
//! [`resolve`] walks a captured backtrace instead. It is slower, but works
//! from code that cannot be annotated with `#[track_caller]` and also reports
//! the enclosing function.
//!
//! In both cases the file is reported relative to the directory of the
//! caller's own source file, which keeps lines short whatever the working
//! directory happens to be.

use std::backtrace::Backtrace;
use std::fmt::Display;
use std::panic::Location;
use std::path::Path;

/// The place a line was produced.
///
/// The zero value (`Source::default()`) stands for "unknown" and is what
/// [`resolve`] returns when the stack is not deep enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Source {
    /// Path relative to the caller's directory.
    pub file: String,
    /// Enclosing function, or empty when it was not recorded.
    pub function: String,
    pub line: u32,
}

impl Source {
    /// The location of the call to the outermost `#[track_caller]` function.
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        let file = location.file();
        Self {
            file: relative_to(file, parent_dir(file)),
            function: String::new(),
            line: location.line(),
        }
    }

    /// Records the enclosing function.
    pub fn with_function(mut self, function: &str) -> Self {
        self.function = function.to_string();
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.file.is_empty() && self.line == 0
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One frame of a rendered backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: Option<String>,
    pub line: u32,
}

/// Resolves the call site `depth` frames above the caller of `resolve`.
///
/// `resolve(0)` is the function that called `resolve`, `resolve(1)` is its
/// caller, and so on. The file is reported relative to the directory of the
/// `resolve(0)` frame.
///
/// When the stack is shallower than requested, or the binary carries no symbol
/// information, this returns `Source::default()`.
///
/// ```rust
/// let far_away = tracemark::callsite::resolve(100_000);
/// assert!(far_away.is_unknown());
/// ```
#[inline(never)]
pub fn resolve(depth: usize) -> Source {
    let rendered = Backtrace::force_capture().to_string();
    let frames = parse_frames(&rendered);

    let Some(own) = frames
        .iter()
        .position(|frame| frame.function.ends_with("callsite::resolve"))
    else {
        return Source::default();
    };
    let Some(target) = own
        .checked_add(1)
        .and_then(|caller| caller.checked_add(depth))
        .and_then(|index| frames.get(index))
    else {
        return Source::default();
    };
    let Some(file) = target.file.as_deref() else {
        return Source::default();
    };

    let anchor = frames
        .get(own + 1)
        .and_then(|frame| frame.file.as_deref())
        .map(parent_dir)
        .unwrap_or("");

    Source {
        file: relative_to(file, anchor),
        function: target.function.clone(),
        line: target.line,
    }
}

/// Parses the text form of a [`std::backtrace::Backtrace`].
///
/// Numbered symbol lines start a frame. Unnumbered, indented symbol lines are
/// inlined calls and count as frames of their own. `at file:line:col` lines
/// attach to the frame before them.
pub fn parse_frames(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for raw in rendered.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.file.is_none() {
                    let (file, line) = split_location(location);
                    frame.file = Some(file.to_string());
                    frame.line = line;
                }
            }
            continue;
        }
        let function = match trimmed.split_once(": ") {
            Some((index, function))
                if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) =>
            {
                function
            }
            _ if raw.starts_with(char::is_whitespace) && !frames.is_empty() => trimmed,
            _ => continue,
        };
        frames.push(Frame {
            function: function.to_string(),
            file: None,
            line: 0,
        });
    }
    frames
}

/// Splits `path:line:column` (column optional) from the right.
fn split_location(location: &str) -> (&str, u32) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next().unwrap_or("");
    let middle = parts.next();
    let rest = parts.next();
    match (rest, middle) {
        (Some(file), Some(line)) => (file, line.parse().unwrap_or(0)),
        (None, Some(file)) => (file, last.parse().unwrap_or(0)),
        _ => (location, 0),
    }
}

fn parent_dir(file: &str) -> &str {
    Path::new(file)
        .parent()
        .and_then(|dir| dir.to_str())
        .unwrap_or("")
}

/// `file` with the `dir` prefix removed, or `file` unchanged when it is not
/// inside `dir`.
pub fn relative_to(file: &str, dir: &str) -> String {
    let file = file.strip_prefix("./").unwrap_or(file);
    let dir = dir.strip_prefix("./").unwrap_or(dir);
    if dir.is_empty() || dir == "." {
        return file.to_string();
    }
    match Path::new(file).strip_prefix(dir) {
        Ok(rest) => rest.to_string_lossy().into_owned(),
        Err(_) => file.to_string(),
    }
}
