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

//! Attribute definitions declared on objects, and the reference-counted registry they live in.

use crate::attrs::{AttrDef, AttrKey};
use crate::builtins::Builtin;
use crate::world::World;
use ahash::{AHashMap, AHashSet};
use muse_common::model::{AttrFlag, WorldStateError};
use muse_common::util::BitEnum;
use muse_var::Obj;
use tracing::{debug, warn};
use uuid::Uuid;

/// Characters that may not appear in an attribute name.
const ILLEGAL_NAME_CHARS: &[char] = &['=', ',', ';', ':', '.', '[', ']', ' '];

struct Registered {
    def: AttrDef,
    refcount: usize,
}

/// Every live user-declared definition, with a count of who refers to it: the declaring
/// object's list, plus each stored value anywhere. A definition is dropped when the count
/// reaches zero.
#[derive(Default)]
pub struct AttrDefRegistry {
    defs: AHashMap<Uuid, Registered>,
}

impl AttrDefRegistry {
    /// Register a new definition. The caller's declaring list holds the first reference.
    pub(crate) fn insert(&mut self, uuid: Uuid, def: AttrDef) {
        self.defs.insert(uuid, Registered { def, refcount: 1 });
    }

    #[must_use]
    pub fn get(&self, uuid: &Uuid) -> Option<&AttrDef> {
        self.defs.get(uuid).map(|r| &r.def)
    }

    #[must_use]
    pub fn refcount(&self, uuid: &Uuid) -> Option<usize> {
        self.defs.get(uuid).map(|r| r.refcount)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub(crate) fn add_ref(&mut self, uuid: &Uuid) -> Result<(), WorldStateError> {
        match self.defs.get_mut(uuid) {
            Some(r) => {
                r.refcount += 1;
                Ok(())
            }
            None => Err(WorldStateError::AttributeDefinitionNotFound(
                muse_var::NOTHING,
                uuid.to_string(),
            )),
        }
    }

    pub(crate) fn release(&mut self, uuid: &Uuid) {
        let Some(r) = self.defs.get_mut(uuid) else {
            warn!(%uuid, "release of unknown attribute definition");
            return;
        };
        r.refcount = r.refcount.saturating_sub(1);
        if r.refcount == 0 {
            debug!(name = %r.def.name, definer = ?r.def.definer, "attribute definition freed");
            self.defs.remove(uuid);
        }
    }

    fn set_flags(&mut self, uuid: &Uuid, flags: BitEnum<AttrFlag>) {
        if let Some(r) = self.defs.get_mut(uuid) {
            r.def.flags = flags;
        }
    }
}

/// Whether `name` may be used as an attribute name.
#[must_use]
pub fn ok_attribute_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(ILLEGAL_NAME_CHARS)
}

/// What `define_attr` did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DefineOutcome {
    /// A new definition was declared.
    Defined(AttrDef),
    /// The object already declared this name; its flags were replaced.
    OptionsSet(AttrDef),
}

impl DefineOutcome {
    #[must_use]
    pub fn def(&self) -> &AttrDef {
        match self {
            Self::Defined(d) | Self::OptionsSet(d) => d,
        }
    }
}

impl World {
    /// Definitions declared directly on `obj`.
    pub fn local_defs(&self, obj: Obj) -> Result<Vec<AttrDef>, WorldStateError> {
        let record = self.record_any(obj)?;
        Ok(record
            .attr_defs
            .iter()
            .filter_map(|uuid| self.defs.get(uuid).cloned())
            .collect())
    }

    /// The definition `obj` itself declares under `name`, ignoring case.
    #[must_use]
    pub fn defined_on(&self, obj: Obj, name: &str) -> Option<AttrDef> {
        let record = self.record_any(obj).ok()?;
        record
            .attr_defs
            .iter()
            .filter_map(|uuid| self.defs.get(uuid))
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Search `obj` and then its ancestors, depth-first, for a definition of `name`.
    #[must_use]
    pub fn find_def(&self, obj: Obj, name: &str) -> Option<AttrDef> {
        let mut visited = AHashSet::new();
        self.find_def_inner(obj, name, &mut visited)
    }

    fn find_def_inner(&self, obj: Obj, name: &str, visited: &mut AHashSet<Obj>) -> Option<AttrDef> {
        if !visited.insert(obj) {
            return None;
        }
        if let Some(def) = self.defined_on(obj, name) {
            return Some(def);
        }
        let parents = self.record_any(obj).ok()?.parents.clone();
        parents
            .into_iter()
            .find_map(|p| self.find_def_inner(p, name, visited))
    }

    /// Declare attribute `name` on `obj`, or update its flags if `obj` already declares it.
    pub fn define_attr(
        &mut self,
        obj: Obj,
        name: &str,
        flags: BitEnum<AttrFlag>,
    ) -> Result<DefineOutcome, WorldStateError> {
        if !ok_attribute_name(name) {
            return Err(WorldStateError::IllegalAttributeName(name.to_string()));
        }
        self.record(obj)?;

        if let Some(existing) = self.defined_on(obj, name) {
            if let AttrKey::Defined(uuid) = existing.key {
                self.cache.flush();
                self.defs.set_flags(&uuid, flags);
            }
            let mut updated = existing;
            updated.flags = flags;
            return Ok(DefineOutcome::OptionsSet(updated));
        }

        let count = self.record(obj)?.attr_defs.len();
        if count >= self.config.max_attr_defs {
            return Err(WorldStateError::TooManyAttributeDefinitions(obj));
        }
        if Builtin::from_name(name).is_some() || self.find_def(obj, name).is_some() {
            return Err(WorldStateError::AttributeShadows(obj, name.to_string()));
        }

        let uuid = Uuid::now_v7();
        let def = AttrDef {
            key: AttrKey::Defined(uuid),
            name: name.to_string(),
            flags,
            definer: obj,
        };
        self.defs.insert(uuid, def.clone());
        self.record_mut(obj)?.attr_defs.push(uuid);
        debug!(?obj, name, "attribute defined");
        Ok(DefineOutcome::Defined(def))
    }

    /// Remove the local definition `name` from `obj`. Its values are cleared from `obj` and every
    /// descendant before the declaring reference is released.
    pub fn undefine_attr(&mut self, obj: Obj, name: &str) -> Result<AttrDef, WorldStateError> {
        let def = self
            .defined_on(obj, name)
            .ok_or_else(|| WorldStateError::AttributeDefinitionNotFound(obj, name.to_string()))?;
        let AttrKey::Defined(uuid) = def.key else {
            return Err(WorldStateError::BuiltinAttribute(def.name));
        };

        self.record_mut(obj)?.attr_defs.retain(|u| *u != uuid);
        let mut visited = AHashSet::new();
        self.remove_from_descendants(obj, &def, &mut visited);
        self.defs.release(&uuid);
        debug!(?obj, name, "attribute undefined");
        Ok(def)
    }

    fn remove_from_descendants(&mut self, obj: Obj, def: &AttrDef, visited: &mut AHashSet<Obj>) {
        if !visited.insert(obj) {
            return;
        }
        // The object may already be gone; the rest of the tree still needs cleaning.
        let _ = self.clear_attr(obj, def);
        let children = self
            .record_any(obj)
            .map(|r| r.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_from_descendants(child, def, visited);
        }
    }
}
