// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod history;
pub mod user;
pub mod verdict;

pub use history::{HistoryItem, HistoryRow, InputType, NewHistoryEntry};
pub use user::{GoogleUser, SessionUser};
pub use verdict::{SafetyCheck, ThreatMatch, Verdict, VerdictRecord};
