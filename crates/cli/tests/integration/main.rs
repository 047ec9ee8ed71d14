//! End-to-end tests driving the cmk binary against stand-in build tools.
//!
//! The stand-ins are `/bin/sh` scripts declared in each project's `cmk.toml`,
//! so these tests only run on unix.

#![cfg(unix)]

mod common;

mod clean_tests;
mod config_tests;
mod run_tests;
