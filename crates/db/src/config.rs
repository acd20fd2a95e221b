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

use serde::{Deserialize, Serialize};

/// Maximum number of attribute definitions a single object may declare.
pub const DEFAULT_MAX_ATTR_DEFS: usize = 90;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// How many attribute definitions one object may declare locally.
    pub max_attr_defs: usize,
    /// Whether attribute reads are memoized. The cache is flushed on every write.
    pub attr_cache: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_attr_defs: DEFAULT_MAX_ATTR_DEFS,
            attr_cache: true,
        }
    }
}
