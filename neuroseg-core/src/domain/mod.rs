//! Core domain types
//!
//! This module contains the domain structures shared between the client,
//! the poller, and the CLI. Everything here is pure data plus a little
//! logic; no I/O.

pub mod segmentation;
pub mod task;
pub mod volumetrics;
