//! ph: command-line client for a feature-flag service
//!
//! Layers:
//! - `domain`: session records, flags, payload shapes (no I/O)
//! - `application`: credential store, login, session resolution, flag operations
//! - `infrastructure`: I/O boundary traits, real implementations, DI container
//! - `cli`: argument parsing, dispatch, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
