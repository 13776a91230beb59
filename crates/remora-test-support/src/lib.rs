#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (native record builders), scripted.rs (scriptable
//! native session double).

pub mod fixtures;
pub mod scripted;

pub use scripted::{NativeCall, ScriptController, ScriptedNativeSession};
