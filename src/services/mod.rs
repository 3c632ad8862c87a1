// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External service clients.

pub mod gemini;
pub mod google_identity;
pub mod image_analysis;
pub mod safe_browsing;

pub use gemini::GeminiClient;
pub use google_identity::{GoogleIdentityVerifier, IdentityError};
pub use image_analysis::ImageAnalysisService;
pub use safe_browsing::SafeBrowsingClient;
