// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Client-side checks run before a request is sent.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SanityError};

static DATASET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]{1,128}$").expect("dataset pattern compiles"));

/// Check that `name` is usable as a dataset name.
///
/// # Errors
///
/// Returns [`SanityError::Validation`] for empty names, names longer than 128
/// characters, and names containing anything besides word characters and dashes.
pub fn dataset(name: &str) -> Result<()> {
    if DATASET_NAME.is_match(name) {
        Ok(())
    } else {
        Err(SanityError::Validation(
            "Datasets can only contain lowercase characters, numbers, underscores and dashes"
                .into(),
        ))
    }
}
