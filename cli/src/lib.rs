// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Parley CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Command handlers, HTTP server bootstrap, server client and
//!   embedded execution

pub mod commands;
pub mod daemon;
pub mod embedded;
