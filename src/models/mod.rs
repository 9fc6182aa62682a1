// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: pure data types shared between the editor session and the content logic.

pub mod clipboard;
pub mod document;
pub mod fragment;
pub mod video;
