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

//! The object table.
//!
//! Objects live in one append-only vector indexed by object number. Destroyed objects stay in
//! the table with the `Going` flag set, so numbers are never reused behind a lock's back.

use crate::attr_cache::AttrReadCache;
use crate::attrs::{AttrKey, AttrValue};
use crate::builtins::Builtin;
use crate::config::DatabaseConfig;
use crate::defs::AttrDefRegistry;
use ahash::AHashSet;
use muse_common::matching::MatchEnvironment;
use muse_common::model::{ObjFlag, ObjType, WorldStateError, flags_string};
use muse_common::util::BitEnum;
use muse_var::{HOME, NOTHING, Obj, SYSTEM_OBJECT};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use uuid::Uuid;

/// Seconds since the epoch, for `Created`/`Modified` stamps.
pub(crate) fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Everything the server knows about one object.
#[derive(Clone, Debug)]
pub struct ObjectRecord {
    pub(crate) name: String,
    pub(crate) obj_type: ObjType,
    pub(crate) flags: BitEnum<ObjFlag>,
    pub(crate) location: Obj,
    pub(crate) zone: Obj,
    pub(crate) contents: Vec<Obj>,
    pub(crate) exits: Vec<Obj>,
    pub(crate) link: Obj,
    pub(crate) owner: Obj,
    pub(crate) parents: Vec<Obj>,
    pub(crate) children: Vec<Obj>,
    /// Definitions this object declares, by registry id.
    pub(crate) attr_defs: Vec<Uuid>,
    pub(crate) attrs: Vec<AttrValue>,
    pub(crate) modified: i64,
    pub(crate) created: i64,
}

impl ObjectRecord {
    pub(crate) fn new(name: &str, obj_type: ObjType, owner: Obj) -> Self {
        let stamp = now();
        Self {
            name: name.to_string(),
            obj_type,
            flags: BitEnum::new(),
            location: NOTHING,
            zone: NOTHING,
            contents: vec![],
            exits: vec![],
            link: NOTHING,
            owner,
            parents: vec![],
            children: vec![],
            attr_defs: vec![],
            attrs: vec![],
            modified: stamp,
            created: stamp,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn obj_type(&self) -> ObjType {
        self.obj_type
    }

    #[must_use]
    pub fn flags(&self) -> BitEnum<ObjFlag> {
        self.flags
    }

    #[must_use]
    pub fn has_flag(&self, flag: ObjFlag) -> bool {
        self.flags.contains(flag)
    }

    #[must_use]
    pub fn location(&self) -> Obj {
        self.location
    }

    #[must_use]
    pub fn zone(&self) -> Obj {
        self.zone
    }

    #[must_use]
    pub fn contents(&self) -> &[Obj] {
        &self.contents
    }

    #[must_use]
    pub fn exits(&self) -> &[Obj] {
        &self.exits
    }

    #[must_use]
    pub fn link(&self) -> Obj {
        self.link
    }

    #[must_use]
    pub fn owner(&self) -> Obj {
        self.owner
    }

    #[must_use]
    pub fn parents(&self) -> &[Obj] {
        &self.parents
    }

    #[must_use]
    pub fn children(&self) -> &[Obj] {
        &self.children
    }

    #[must_use]
    pub fn modified(&self) -> i64 {
        self.modified
    }

    #[must_use]
    pub fn created(&self) -> i64 {
        self.created
    }

    /// The value stored directly on this object for `key`, ignoring inheritance.
    #[must_use]
    pub fn local_value(&self, key: AttrKey) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

pub struct World {
    objects: Vec<ObjectRecord>,
    pub(crate) defs: AttrDefRegistry,
    pub(crate) cache: AttrReadCache,
    pub(crate) config: DatabaseConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new(DatabaseConfig::default())
    }
}

impl World {
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            objects: vec![],
            defs: AttrDefRegistry::default(),
            cache: AttrReadCache::new(config.attr_cache),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    #[must_use]
    pub fn defs(&self) -> &AttrDefRegistry {
        &self.defs
    }

    /// Size of the object table, destroyed objects included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects that currently exist, in number order.
    pub fn valid_objects(&self) -> impl Iterator<Item = Obj> + '_ {
        (0..self.objects.len())
            .filter_map(|i| i32::try_from(i).ok())
            .map(Obj::mk_id)
            .filter(|o| self.valid(*o))
    }

    /// In range and not destroyed.
    #[must_use]
    pub fn valid(&self, obj: Obj) -> bool {
        self.record(obj).is_ok()
    }

    /// The record of an existing object.
    pub fn record(&self, obj: Obj) -> Result<&ObjectRecord, WorldStateError> {
        let record = self.record_any(obj)?;
        if record.flags.contains(ObjFlag::Going) {
            return Err(WorldStateError::ObjectNotFound(obj));
        }
        Ok(record)
    }

    /// The record in `obj`'s slot, destroyed or not.
    pub fn record_any(&self, obj: Obj) -> Result<&ObjectRecord, WorldStateError> {
        obj.as_index()
            .and_then(|i| self.objects.get(i))
            .ok_or(WorldStateError::ObjectNotFound(obj))
    }

    pub(crate) fn record_mut(&mut self, obj: Obj) -> Result<&mut ObjectRecord, WorldStateError> {
        obj.as_index()
            .and_then(|i| self.objects.get_mut(i))
            .ok_or(WorldStateError::ObjectNotFound(obj))
    }

    /// Append a record to the table as-is, returning its number.
    pub(crate) fn push_record(&mut self, record: ObjectRecord) -> Result<Obj, WorldStateError> {
        let id = i32::try_from(self.objects.len())
            .map_err(|_| WorldStateError::ObjectNotFound(NOTHING))?;
        self.objects.push(record);
        Ok(Obj::mk_id(id))
    }

    /// Create an object. An owner of `NOTHING` makes it own itself; a location of `NOTHING`
    /// leaves it nowhere. Exits are filed under their location's exit list.
    pub fn create_object(
        &mut self,
        name: &str,
        obj_type: ObjType,
        owner: Obj,
        location: Obj,
    ) -> Result<Obj, WorldStateError> {
        if location != NOTHING {
            self.record(location)?;
        }
        if owner != NOTHING {
            self.record(owner)?;
        }
        self.cache.flush();

        let obj = self.push_record(ObjectRecord::new(name, obj_type, owner))?;
        if owner == NOTHING {
            self.record_mut(obj)?.owner = obj;
        }
        if location != NOTHING {
            self.attach(obj, location)?;
        }
        debug!(?obj, name, %obj_type, ?location, "object created");
        Ok(obj)
    }

    /// A new object with `source`'s name, type, flags, parents, zone, link and non-inheritable
    /// attribute values, placed in `location`.
    pub fn clone_object(
        &mut self,
        source: Obj,
        owner: Obj,
        location: Obj,
    ) -> Result<Obj, WorldStateError> {
        let original = self.record(source)?.clone();
        let obj = self.create_object(&original.name, original.obj_type, owner, location)?;
        {
            let record = self.record_mut(obj)?;
            record.flags = original.flags;
            record.zone = original.zone;
            record.link = original.link;
        }
        for parent in &original.parents {
            self.add_parent(obj, *parent)?;
        }
        self.copy_noninherited(obj, source)?;
        Ok(obj)
    }

    /// Destroy `obj`: its definitions are undefined everywhere, its values are freed, and it is
    /// detached from its location and the parent graph. The slot is kept as a tombstone.
    pub fn destroy_object(&mut self, obj: Obj) -> Result<(), WorldStateError> {
        if obj == SYSTEM_OBJECT {
            return Err(WorldStateError::ObjectPermissionDenied);
        }
        let names: Vec<String> = self
            .local_defs(obj)?
            .into_iter()
            .map(|d| d.name)
            .collect();
        self.record(obj)?;
        for name in names {
            self.undefine_attr(obj, &name)?;
        }
        self.free_attrs(obj)?;
        self.detach(obj)?;

        let (parents, children, contents, exits) = {
            let record = self.record_mut(obj)?;
            (
                std::mem::take(&mut record.parents),
                std::mem::take(&mut record.children),
                std::mem::take(&mut record.contents),
                std::mem::take(&mut record.exits),
            )
        };
        for parent in parents {
            if let Ok(p) = self.record_mut(parent) {
                p.children.retain(|c| *c != obj);
            }
        }
        for child in children {
            if let Ok(c) = self.record_mut(child) {
                c.parents.retain(|p| *p != obj);
            }
        }
        for inside in contents.into_iter().chain(exits) {
            if let Ok(r) = self.record_mut(inside) {
                r.location = NOTHING;
            }
        }

        let record = self.record_mut(obj)?;
        record.flags.set(ObjFlag::Going);
        record.modified = now();
        info!(?obj, "object destroyed");
        Ok(())
    }

    fn attach(&mut self, obj: Obj, location: Obj) -> Result<(), WorldStateError> {
        let is_exit = self.record_any(obj)?.obj_type == ObjType::Exit;
        let dest = self.record_mut(location)?;
        if is_exit {
            dest.exits.push(obj);
        } else {
            dest.contents.push(obj);
        }
        self.record_mut(obj)?.location = location;
        Ok(())
    }

    fn detach(&mut self, obj: Obj) -> Result<(), WorldStateError> {
        let location = self.record_any(obj)?.location;
        if let Ok(old) = self.record_mut(location) {
            old.contents.retain(|o| *o != obj);
            old.exits.retain(|o| *o != obj);
        }
        self.record_mut(obj)?.location = NOTHING;
        Ok(())
    }

    /// Move `obj` into `dest`. Refuses to put something inside itself, directly or not.
    pub fn move_to(&mut self, obj: Obj, dest: Obj) -> Result<(), WorldStateError> {
        self.record(obj)?;
        if dest != NOTHING {
            self.record(dest)?;
            let mut visited = AHashSet::new();
            let mut current = dest;
            while current != NOTHING && visited.insert(current) {
                if current == obj {
                    return Err(WorldStateError::RecursiveMove(obj, dest));
                }
                current = self.record_any(current).map_or(NOTHING, |r| r.location);
            }
        }
        self.cache.flush();
        self.detach(obj)?;
        if dest != NOTHING {
            self.attach(obj, dest)?;
        }
        Ok(())
    }

    /// Make `parent` a parent of `child`. Refuses to create a cycle.
    pub fn add_parent(&mut self, child: Obj, parent: Obj) -> Result<(), WorldStateError> {
        self.record(child)?;
        self.record(parent)?;
        if self.is_a(parent, child) {
            return Err(WorldStateError::RecursiveParent(child, parent));
        }
        self.cache.flush();
        let record = self.record_mut(child)?;
        if record.parents.contains(&parent) {
            return Ok(());
        }
        record.parents.push(parent);
        self.record_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn remove_parent(&mut self, child: Obj, parent: Obj) -> Result<(), WorldStateError> {
        self.cache.flush();
        self.record_mut(child)?.parents.retain(|p| *p != parent);
        self.record_mut(parent)?.children.retain(|c| *c != child);
        Ok(())
    }

    pub fn set_flag(&mut self, obj: Obj, flag: ObjFlag, on: bool) -> Result<(), WorldStateError> {
        self.cache.flush();
        let record = self.record_mut(obj)?;
        if on {
            record.flags.set(flag);
        } else {
            record.flags.clear(flag);
        }
        Ok(())
    }

    pub fn set_zone(&mut self, obj: Obj, zone: Obj) -> Result<(), WorldStateError> {
        if zone != NOTHING {
            self.record(zone)?;
        }
        self.cache.flush();
        self.record_mut(obj)?.zone = zone;
        Ok(())
    }

    pub fn set_link(&mut self, obj: Obj, link: Obj) -> Result<(), WorldStateError> {
        self.cache.flush();
        self.record_mut(obj)?.link = link;
        Ok(())
    }

    pub fn set_owner(&mut self, obj: Obj, owner: Obj) -> Result<(), WorldStateError> {
        self.record(owner)?;
        self.cache.flush();
        self.record_mut(obj)?.owner = owner;
        Ok(())
    }

    /// Stamp `obj` as modified now.
    pub fn touch(&mut self, obj: Obj) -> Result<(), WorldStateError> {
        self.cache.flush();
        self.record_mut(obj)?.modified = now();
        Ok(())
    }

    #[must_use]
    pub fn owner_of(&self, obj: Obj) -> Obj {
        self.record_any(obj).map_or(NOTHING, |r| r.owner)
    }

    #[must_use]
    pub fn name_of(&self, obj: Obj) -> String {
        self.record_any(obj)
            .map(|r| r.name.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_wizard(&self, obj: Obj) -> bool {
        self.record(obj).is_ok_and(|r| r.has_flag(ObjFlag::Wizard))
    }

    /// Whether `who` may act as the owner of `what`.
    #[must_use]
    pub fn controls(&self, who: Obj, what: Obj) -> bool {
        let (Ok(who_rec), Ok(what_rec)) = (self.record(who), self.record(what)) else {
            return false;
        };
        if who_rec.has_flag(ObjFlag::Wizard) || who == what {
            return true;
        }
        who_rec.owner == what_rec.owner
            && (who_rec.owner == who
                || who_rec.has_flag(ObjFlag::InheritPowers)
                || !what_rec.has_flag(ObjFlag::InheritPowers))
    }

    /// The type letter and flag letters of `obj`, as shown after its number.
    #[must_use]
    pub fn flags_string(&self, obj: Obj) -> String {
        self.record_any(obj)
            .map(|r| flags_string(r.obj_type, r.flags))
            .unwrap_or_default()
    }

    /// `obj` rendered for `viewer`: `Name(#nFLAGS)` when the viewer is entitled to the number,
    /// plain `Name` otherwise.
    #[must_use]
    pub fn unparse_object(&self, viewer: Obj, obj: Obj) -> String {
        if obj == NOTHING {
            return "*NOTHING*".to_string();
        }
        if obj == HOME {
            return "*HOME*".to_string();
        }
        let Ok(record) = self.record_any(obj) else {
            return format!("<invalid {obj}>");
        };
        let show_number = record.owner == viewer
            || self.controls(viewer, obj)
            || (record.obj_type == ObjType::Room && record.has_flag(ObjFlag::JumpOk))
            || record.has_flag(ObjFlag::ChownOk)
            || record.has_flag(ObjFlag::SeeOk)
            || self.is_wizard(viewer);
        if show_number {
            format!("{}({obj}{})", record.name, self.flags_string(obj))
        } else {
            record.name.clone()
        }
    }

    /// A player by name (or alias), ignoring case.
    #[must_use]
    pub fn find_player(&self, name: &str) -> Option<Obj> {
        let alias = Builtin::Alias.def();
        self.valid_objects().find(|o| {
            self.record_any(*o).is_ok_and(|r| {
                r.obj_type == ObjType::Player
                    && (r.name.eq_ignore_ascii_case(name)
                        || r.local_value(alias.key())
                            .is_some_and(|a| a.eq_ignore_ascii_case(name)))
            })
        })
    }
}

impl MatchEnvironment for World {
    fn obj_valid(&self, oid: &Obj) -> Result<bool, WorldStateError> {
        Ok(self.valid(*oid))
    }

    fn get_names(&self, oid: &Obj) -> Result<Vec<String>, WorldStateError> {
        let record = self.record(*oid)?;
        let mut names: Vec<String> = if record.obj_type == ObjType::Exit {
            record.name.split(';').map(str::to_string).collect()
        } else {
            vec![record.name.clone()]
        };
        if record.obj_type == ObjType::Player
            && let Some(alias) = record.local_value(Builtin::Alias.def().key())
        {
            names.push(alias.to_string());
        }
        Ok(names)
    }

    fn get_surroundings(&self, actor: &Obj) -> Result<Vec<Obj>, WorldStateError> {
        let record = self.record(*actor)?;
        let mut surroundings = vec![];
        if let Ok(location) = self.record(record.location) {
            surroundings.extend(location.exits.iter());
            surroundings.extend(location.contents.iter().filter(|o| *o != actor));
        }
        surroundings.extend(record.contents.iter());
        Ok(surroundings)
    }

    fn location_of(&self, oid: &Obj) -> Result<Obj, WorldStateError> {
        Ok(self.record(*oid)?.location)
    }

    fn find_player(&self, name: &str) -> Result<Option<Obj>, WorldStateError> {
        Ok(World::find_player(self, name))
    }
}
