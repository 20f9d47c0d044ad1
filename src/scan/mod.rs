// SPDX-License-Identifier: GPL-3.0-only

//! Scan orchestration and result types

pub mod engine;
pub mod types;

pub use engine::ScanEngine;
pub use types::{ScanAction, ScanResult, ScanState};
