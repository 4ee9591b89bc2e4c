//! Testing utilities for TIA workspace
//!
//! Shared unit fixtures, table fixtures, fault-injecting test doubles and
//! captured diagnostics.

#![allow(missing_docs)]

pub mod fakes;
pub mod fixtures;
pub mod logs;
pub mod tables;

pub use fakes::{
    FailingGenerator, FaultyRewriter, RecordedContext, RecordingGenerator, RewriteCall, RewriteLog,
};
pub use logs::LogCapture;
