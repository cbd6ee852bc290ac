//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# tracemark

tracemark is a print-debugging helper for Rust.

# The problem

When chasing a bug, I reach for `println!`.  A few minutes later I have a dozen of them, and:

* I can't tell which `println!` produced which line.
* Output from the code I'm tracing interleaves with output from everything else.
* I keep rewriting the same `{:?}` boilerplate to look at a struct.
* I want to know which request/user/iteration a line belongs to, without threading that value everywhere.

A logging framework solves these problems by being a logging framework: levels, sinks, filters, setup.
That is too much ceremony for code that will be deleted before the commit.

tracemark is not a logging or metrics pipeline.  There are no levels, sinks or sampling.  It prints lines.

# The API

```rust
# use tracemark::{here, msg, objs};
# let user = "alice";
# #[derive(Debug)] struct Request { id: u32 }
# let request = Request { id: 7 };
here!();                              // TRACE: main.rs:12
msg!("looking up {}", user);          // TRACE: main.rs:13 - looking up alice
objs!(request, user);                 // TRACE: main.rs:14 - [0] Request { id: 7 }, [1] "alice"
tracemark::stack(3);                  // first three lines of the backtrace
```

Every line starts with the file and line that produced it.  This is resolved with `#[track_caller]`,
so it is right even if you wrap tracemark in your own helper (as long as the helper is `#[track_caller]` too).

# Context

```rust
tracemark::add_context("req", "42");
tracemark::msg!("start");     // TRACE: main.rs:3 (req:42) - start
tracemark::remove_context("req");
```

Contexts stack in the order they were added and stay until removed.

# Buffering

The default tracer prints each line as it is produced.  Turn that off and lines collect until a flush,
which writes them as one aligned block in a single write:

```text
TRACE: -----
TRACE: worker.rs:40 (job:7) - claimed
TRACE: db.rs:112            - query took 3ms
TRACE: worker.rs:52 (job:7)
TRACE: =====
```

Because the block is one write, it does not interleave with other output to the same stream.

```rust
use tracemark::{MemorySink, Tracer, TracerConfig};

let sink = MemorySink::new();
let tracer = Tracer::with_writer(TracerConfig::buffered(), sink.clone());
tracer.msg("one");
tracer.msg("two");
assert_eq!(sink.contents(), "");
tracer.flush();
assert_eq!(sink.contents().lines().count(), 4);
```

# Multithreading

A [`Tracer`] is `Send + Sync`; share it with `Arc`.  Appends and flushes are serialized, so a flushed
block never contains half a line.  Contexts belong to the tracer, not to the thread: two threads
pushing contexts onto the same tracer will see each other's.  Give each unit of work its own tracer
when that matters, and carry it with [`Tracer::enter`] / [`scope::current`] (or
[`scope::ApplyTracer`] for futures) instead of a global.
*/

mod config;
mod global;
mod memory_sink;
mod spinlock;
mod stdout_sink;
mod tracer;
mod macros;
pub mod callsite;
pub mod context;
pub mod line;
pub mod scope;

pub use callsite::Source;
pub use config::{DEFAULT_LINE_PREFIX, TracerConfig};
pub use context::{ContextEntry, ContextStack};
pub use global::{
    add_context, default_tracer, flush, here, msg, objs, remove_all_contexts, remove_context,
    remove_previous_context, set_auto_flush, set_default_tracer, set_line_prefix, set_writer, stack,
};
pub use line::Line;
pub use memory_sink::MemorySink;
pub use stdout_sink::StdoutSink;
pub use tracer::Tracer;

#[doc(hidden)]
pub mod hidden {
    pub use crate::macros::emit;
}
