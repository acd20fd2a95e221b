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

//! The attribute store: per-object value entries and the inherited read path.

use crate::builtins::Builtin;
use crate::world::World;
use ahash::AHashSet;
use muse_common::model::{AttrFlag, WorldStateError};
use muse_common::util::BitEnum;
use muse_var::{NOTHING, Obj};
use std::fmt::{Display, Formatter};
use tracing::trace;
use uuid::Uuid;

/// Identity of an attribute definition.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum AttrKey {
    /// One of the server's built in attributes, by number.
    Builtin(u16),
    /// A definition declared on some object.
    Defined(Uuid),
}

/// An attribute definition: a name and flags, plus the object that declared it (`NOTHING` for
/// builtins).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttrDef {
    pub(crate) key: AttrKey,
    pub(crate) name: String,
    pub(crate) flags: BitEnum<AttrFlag>,
    pub(crate) definer: Obj,
}

impl AttrDef {
    #[must_use]
    pub fn key(&self) -> AttrKey {
        self.key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn flags(&self) -> BitEnum<AttrFlag> {
        self.flags
    }

    #[must_use]
    pub fn definer(&self) -> Obj {
        self.definer
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        matches!(self.key, AttrKey::Builtin(_))
    }

    /// Computed from object fields rather than stored.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.flags.contains(AttrFlag::Builtin)
    }

    #[must_use]
    pub fn has_flag(&self, flag: AttrFlag) -> bool {
        self.flags.contains(flag)
    }
}

impl Display for AttrDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.definer == NOTHING {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.definer, self.name)
        }
    }
}

/// One stored value on an object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttrValue {
    pub(crate) key: AttrKey,
    pub(crate) value: String,
}

impl AttrValue {
    #[must_use]
    pub fn key(&self) -> AttrKey {
        self.key
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl World {
    /// Store `value` for `def` on `obj`. An empty value removes the entry.
    pub fn set_attr(&mut self, obj: Obj, def: &AttrDef, value: &str) -> Result<(), WorldStateError> {
        if def.is_computed() {
            return Err(WorldStateError::BuiltinAttribute(def.name.clone()));
        }
        self.cache.flush();

        let key = def.key;
        let record = self.record_mut(obj)?;
        let position = record.attrs.iter().position(|a| a.key == key);
        match (position, value.is_empty()) {
            (None, true) => Ok(()),
            (Some(idx), true) => {
                record.attrs.remove(idx);
                self.release_key(key);
                Ok(())
            }
            (Some(idx), false) => {
                let entry = &mut record.attrs[idx].value;
                if value.len() <= entry.capacity() {
                    entry.clear();
                    entry.push_str(value);
                } else {
                    *entry = value.to_string();
                }
                Ok(())
            }
            (None, false) => {
                record.attrs.push(AttrValue {
                    key,
                    value: value.to_string(),
                });
                if let Err(e) = self.ref_key(key) {
                    // The definition went away underneath the caller; don't keep a dangling entry.
                    if let Ok(record) = self.record_mut(obj) {
                        record.attrs.retain(|a| a.key != key);
                    }
                    return Err(e);
                }
                Ok(())
            }
        }
    }

    /// Read `def` on `obj`: computed builtins first, then the local value, then (for inheritable
    /// definitions) the first non-empty value found depth-first through the parents.
    #[must_use]
    pub fn get_attr(&self, obj: Obj, def: &AttrDef) -> String {
        let Ok(record) = self.record_any(obj) else {
            return String::new();
        };

        if def.is_computed() {
            return match def.key {
                AttrKey::Builtin(id) => Builtin::compute(id, self, obj, record),
                AttrKey::Defined(_) => String::new(),
            };
        }

        if let Some(cached) = self.cache.lookup(obj, def.key) {
            return cached;
        }

        let value = match record.local_value(def.key) {
            Some(local) => local.to_string(),
            None if def.has_flag(AttrFlag::Inherit) => {
                let mut visited = AHashSet::new();
                visited.insert(obj);
                record
                    .parents
                    .iter()
                    .find_map(|p| self.inherited_value(*p, def.key, &mut visited))
                    .unwrap_or_default()
            }
            None => String::new(),
        };
        trace!(?obj, attr = %def, "attribute read");
        self.cache.fill(obj, def.key, &value);
        value
    }

    fn inherited_value(&self, obj: Obj, key: AttrKey, visited: &mut AHashSet<Obj>) -> Option<String> {
        if !visited.insert(obj) {
            return None;
        }
        let record = self.record_any(obj).ok()?;
        if let Some(local) = record.local_value(key)
            && !local.is_empty()
        {
            return Some(local.to_string());
        }
        record
            .parents
            .iter()
            .find_map(|p| self.inherited_value(*p, key, visited))
    }

    /// Remove the local entry for `def` on `obj`, if any. Inherited values become visible again.
    pub fn clear_attr(&mut self, obj: Obj, def: &AttrDef) -> Result<(), WorldStateError> {
        self.cache.flush();
        let record = self.record_mut(obj)?;
        let before = record.attrs.len();
        record.attrs.retain(|a| a.key != def.key);
        if record.attrs.len() != before {
            self.release_key(def.key);
        }
        Ok(())
    }

    /// Drop every value entry on `obj`, releasing the definitions they held.
    pub fn free_attrs(&mut self, obj: Obj) -> Result<(), WorldStateError> {
        self.cache.flush();
        let entries = std::mem::take(&mut self.record_mut(obj)?.attrs);
        for entry in entries {
            self.release_key(entry.key);
        }
        Ok(())
    }

    /// Copy every non-inheritable value from `source` onto `dest`, replacing whatever `dest` had.
    pub fn copy_noninherited(&mut self, dest: Obj, source: Obj) -> Result<(), WorldStateError> {
        let copied: Vec<AttrValue> = self
            .record_any(source)?
            .attrs
            .iter()
            .filter(|a| !self.key_has_flag(a.key, AttrFlag::Inherit))
            .cloned()
            .collect();
        self.free_attrs(dest)?;
        for entry in &copied {
            self.ref_key(entry.key)?;
        }
        self.record_mut(dest)?.attrs = copied;
        Ok(())
    }

    /// Every stored value on `obj` paired with its definition.
    pub fn local_attrs(&self, obj: Obj) -> Result<Vec<(AttrDef, String)>, WorldStateError> {
        let record = self.record_any(obj)?;
        Ok(record
            .attrs
            .iter()
            .filter_map(|a| self.def_for_key(a.key).map(|d| (d, a.value.clone())))
            .collect())
    }

    /// Look up the current definition for a key.
    #[must_use]
    pub fn def_for_key(&self, key: AttrKey) -> Option<AttrDef> {
        match key {
            AttrKey::Builtin(id) => Builtin::from_id(id).map(Builtin::def),
            AttrKey::Defined(uuid) => self.defs.get(&uuid).cloned(),
        }
    }

    fn key_has_flag(&self, key: AttrKey, flag: AttrFlag) -> bool {
        self.def_for_key(key).is_some_and(|d| d.has_flag(flag))
    }

    fn ref_key(&mut self, key: AttrKey) -> Result<(), WorldStateError> {
        match key {
            AttrKey::Builtin(_) => Ok(()),
            AttrKey::Defined(uuid) => self.defs.add_ref(&uuid),
        }
    }

    pub(crate) fn release_key(&mut self, key: AttrKey) {
        if let AttrKey::Defined(uuid) = key {
            self.defs.release(&uuid);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builtins::Builtin;
    use crate::world::World;
    use muse_common::model::{AttrFlag, ObjType, WorldStateError};
    use muse_common::util::BitEnum;
    use muse_var::NOTHING;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_get_clear_local() {
        let mut world = World::default();
        let thing = world
            .create_object("widget", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        let desc = Builtin::Desc.def();

        assert_eq!(world.get_attr(thing, &desc), "");
        world.set_attr(thing, &desc, "A small widget.").unwrap();
        assert_eq!(world.get_attr(thing, &desc), "A small widget.");
        world.set_attr(thing, &desc, "Tiny.").unwrap();
        assert_eq!(world.get_attr(thing, &desc), "Tiny.");
        world.clear_attr(thing, &desc).unwrap();
        assert_eq!(world.get_attr(thing, &desc), "");
    }

    #[test]
    fn test_inherited_value_shadowed_then_restored() {
        let mut world = World::default();
        let parent = world
            .create_object("parent", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        let child = world
            .create_object("child", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        world.add_parent(child, parent).unwrap();
        let bar = world
            .define_attr(parent, "BAR", BitEnum::new_with(AttrFlag::Inherit))
            .unwrap()
            .def()
            .clone();

        world.set_attr(parent, &bar, "x").unwrap();
        assert_eq!(world.get_attr(child, &bar), "x");
        world.set_attr(child, &bar, "y").unwrap();
        assert_eq!(world.get_attr(child, &bar), "y");
        world.clear_attr(child, &bar).unwrap();
        assert_eq!(world.get_attr(child, &bar), "x");
    }

    #[test]
    fn test_non_inherited_value_stays_local() {
        let mut world = World::default();
        let parent = world
            .create_object("parent", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        let child = world
            .create_object("child", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        world.add_parent(child, parent).unwrap();
        let secret = world
            .define_attr(parent, "SECRET", BitEnum::new())
            .unwrap()
            .def()
            .clone();
        world.set_attr(parent, &secret, "hidden").unwrap();
        assert_eq!(world.get_attr(child, &secret), "");
    }

    #[test]
    fn test_computed_builtins() {
        let mut world = World::default();
        let room = world
            .create_object("Hall", ObjType::Room, NOTHING, NOTHING)
            .unwrap();
        let a = world
            .create_object("apple", ObjType::Thing, NOTHING, room)
            .unwrap();
        let b = world
            .create_object("banana", ObjType::Thing, NOTHING, room)
            .unwrap();

        assert_eq!(world.get_attr(a, &Builtin::Location.def()), room.to_literal());
        assert_eq!(world.get_attr(a, &Builtin::Name.def()), "apple");
        assert_eq!(
            world.get_attr(room, &Builtin::Contents.def()),
            format!("{a} {b}")
        );
        assert_eq!(world.get_attr(a, &Builtin::Next.def()), b.to_literal());
        assert_eq!(world.get_attr(b, &Builtin::Next.def()), "#-1");
        assert_eq!(world.get_attr(a, &Builtin::Flags.def()), "T");
        assert_eq!(
            world.set_attr(a, &Builtin::Name.def(), "pear"),
            Err(WorldStateError::BuiltinAttribute("Name".to_string()))
        );
    }

    #[test]
    fn test_cache_sees_writes() {
        let mut world = World::default();
        let thing = world
            .create_object("thing", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        let desc = Builtin::Desc.def();
        world.set_attr(thing, &desc, "one").unwrap();
        assert_eq!(world.get_attr(thing, &desc), "one");
        assert_eq!(world.cache.len(), 1);
        world.set_attr(thing, &desc, "a much longer value than before").unwrap();
        assert!(world.cache.is_empty());
        assert_eq!(world.get_attr(thing, &desc), "a much longer value than before");
    }

    #[test]
    fn test_refcounts_follow_values() {
        let mut world = World::default();
        let definer = world
            .create_object("definer", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        let other = world
            .create_object("other", ObjType::Thing, NOTHING, NOTHING)
            .unwrap();
        let foo = world
            .define_attr(definer, "FOO", BitEnum::new())
            .unwrap()
            .def()
            .clone();
        let uuid = match foo.key() {
            crate::attrs::AttrKey::Defined(u) => u,
            crate::attrs::AttrKey::Builtin(_) => unreachable!(),
        };

        assert_eq!(world.defs.refcount(&uuid), Some(1));
        world.set_attr(definer, &foo, "a").unwrap();
        world.set_attr(other, &foo, "b").unwrap();
        assert_eq!(world.defs.refcount(&uuid), Some(3));
        world.set_attr(other, &foo, "").unwrap();
        assert_eq!(world.defs.refcount(&uuid), Some(2));
        world.free_attrs(definer).unwrap();
        assert_eq!(world.defs.refcount(&uuid), Some(1));
    }
}
