// SPDX-License-Identifier: GPL-3.0-only

//! Hardware backend abstraction

pub mod camera;
