// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for Parley CLI

pub mod config;
pub mod message;
pub mod status;

pub use self::config::ConfigCommand;
pub use self::message::{AnalyzeArgs, RewriteArgs};
