//! End-to-end processing of one logos-format invocation.
//!
//! The pipeline moves through fixed stages:
//!
//! **Classify** - pick Logos files out of the formatter arguments; an
//! unreadable or unwritable one aborts before anything touches the disk.
//!
//! **Forward transform** - rewrite each Logos file into a clang-format-legal
//! intermediate inside a temporary workspace.
//!
//! **Invoke formatter** - run clang-format once over all intermediates and
//! the untouched arguments. A failure here ends the run with the formatter's
//! exit code and no file changed.
//!
//! **Commit** - rewrite markers back into directives and either print the
//! result or atomically replace each original.
//!
//! **Cleanup** - delete the workspace unless asked to keep it.
//!
//! The main entry point is [`Pipeline::run`].

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineOptions, PipelineStatus};
