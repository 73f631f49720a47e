// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Code generation for Sona.
//!
//! This module contains code generators for different target formats:
//! - **`python`**: Python 3 source text, the only target today

pub mod python;
