//! Shared test harness modules for the mapsift CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::extract::{
    ExtractArgs, ExtractConfig, execute_extract, resolve_extract_config, run_extract,
};
use super::*;

mod helpers;
