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

use crate::attrs::AttrKey;
use ahash::AHasher;
use muse_var::Obj;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::{Mutex, MutexGuard, PoisonError};

type Entries = HashMap<(Obj, AttrKey), String, BuildHasherDefault<AHasher>>;

/// Memo of resolved attribute values, keyed by (object, definition).
///
/// Inherited values depend on every ancestor, so rather than track dependencies the whole cache
/// is dropped on any write to the world.
pub(crate) struct AttrReadCache {
    inner: Mutex<Inner>,
}

struct Inner {
    enabled: bool,
    entries: Entries,
}

impl AttrReadCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                enabled,
                entries: Entries::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries are plain strings; a panic mid-update cannot leave them inconsistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lookup(&self, obj: Obj, key: AttrKey) -> Option<String> {
        let inner = self.lock();
        if !inner.enabled {
            return None;
        }
        inner.entries.get(&(obj, key)).cloned()
    }

    pub fn fill(&self, obj: Obj, key: AttrKey, value: &str) {
        let mut inner = self.lock();
        if !inner.enabled {
            return;
        }
        inner.entries.insert((obj, key), value.to_string());
    }

    pub fn flush(&self) {
        self.lock().entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
