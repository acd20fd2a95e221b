// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Limits applied while compiling and evaluating locks. Created by the host and handed to the
//! evaluator.

use muse_common::BUFFER_LEN;
use serde::{Deserialize, Serialize};

/// How many `@` indirections (plus the top-level lock itself) one evaluation may pass through.
pub const DEFAULT_MAX_LOCK_DEPTH: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KernelConfig {
    /// Lock text, compiled or expanded, must be shorter than this many bytes.
    pub buffer_len: usize,
    pub max_lock_depth: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            buffer_len: BUFFER_LEN,
            max_lock_depth: DEFAULT_MAX_LOCK_DEPTH,
        }
    }
}
