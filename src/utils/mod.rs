// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Shared helper utilities reused by the models and the upload path.

pub mod sanitize_component;

/// Sanitize user-provided file names into safe upload names.
pub use sanitize_component::sanitize_component;
