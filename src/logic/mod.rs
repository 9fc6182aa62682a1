// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Content pipeline: sanitizing, embed recognition and synthesis, block codec, reconciliation
//! and the image upload gateway.

pub mod codec;
pub mod embed;
pub mod reconcile;
pub mod sanitize;
pub mod upload;
