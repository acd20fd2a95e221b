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

//! Building a world from a declarative description, as read from a YAML or JSON file.
//!
//! Objects are numbered by their position in the list. Parent links are taken as written, with
//! no cycle check, so damaged databases can be reproduced.

use crate::attrs::AttrDef;
use crate::config::DatabaseConfig;
use crate::world::{ObjectRecord, World};
use muse_common::model::{AttrFlag, ObjFlag, ObjType, WorldStateError};
use muse_var::{HOME, NOTHING, Obj};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldFixture {
    pub config: DatabaseConfig,
    pub objects: Vec<ObjectFixture>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ObjectFixture {
    pub name: String,
    #[serde(rename = "type")]
    pub obj_type: ObjType,
    /// Defaults to the object itself.
    #[serde(default)]
    pub owner: Option<Obj>,
    #[serde(default = "nothing")]
    pub location: Obj,
    #[serde(default = "nothing")]
    pub zone: Obj,
    #[serde(default = "nothing")]
    pub link: Obj,
    #[serde(default)]
    pub flags: Vec<ObjFlag>,
    #[serde(default)]
    pub parents: Vec<Obj>,
    /// Attribute definitions declared here: name to a space separated option list.
    #[serde(default)]
    pub defs: BTreeMap<String, String>,
    /// Stored values. Keys are builtin names, names of definitions reachable from this object,
    /// or `#n.NAME` for a definition declared on `#n`.
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

fn nothing() -> Obj {
    NOTHING
}

#[derive(Debug, Error, PartialEq)]
pub enum FixtureError {
    #[error("object {0} refers to {1}, which is not in the world")]
    BadReference(Obj, Obj),
    #[error("object {0}: no attribute named {1:?}")]
    UnknownAttribute(Obj, String),
    #[error("object {0}: unknown attribute options {1:?}")]
    UnknownOptions(Obj, Vec<String>),
    #[error(transparent)]
    World(#[from] WorldStateError),
}

impl World {
    pub fn from_fixture(fixture: &WorldFixture) -> Result<Self, FixtureError> {
        let mut world = World::new(fixture.config.clone());
        let count = fixture.objects.len();
        let in_range = |o: Obj| o == NOTHING || o == HOME || o.as_index().is_some_and(|i| i < count);

        let mut ids = Vec::with_capacity(count);
        for object in &fixture.objects {
            let mut record = ObjectRecord::new(&object.name, object.obj_type, NOTHING);
            record.flags = object.flags.iter().copied().collect();
            ids.push(world.push_record(record)?);
        }

        for (obj, object) in ids.iter().copied().zip(&fixture.objects) {
            let owner = object.owner.unwrap_or(obj);
            let references = [owner, object.location, object.zone, object.link]
                .into_iter()
                .chain(object.parents.iter().copied());
            for reference in references {
                if !in_range(reference) {
                    return Err(FixtureError::BadReference(obj, reference));
                }
            }
            {
                let record = world.record_mut(obj)?;
                record.owner = owner;
                record.zone = object.zone;
                record.link = object.link;
                record.parents.clone_from(&object.parents);
            }
            for parent in &object.parents {
                world.record_mut(*parent)?.children.push(obj);
            }
            if object.location != NOTHING && object.location != HOME {
                let location = world.record_mut(object.location)?;
                if object.obj_type == ObjType::Exit {
                    location.exits.push(obj);
                } else {
                    location.contents.push(obj);
                }
                world.record_mut(obj)?.location = object.location;
            }
        }

        for (obj, object) in ids.iter().copied().zip(&fixture.objects) {
            for (name, options) in &object.defs {
                let (flags, unknown) = AttrFlag::parse_options(options);
                if !unknown.is_empty() {
                    return Err(FixtureError::UnknownOptions(obj, unknown));
                }
                world.define_attr(obj, name, flags)?;
            }
        }

        for (obj, object) in ids.iter().copied().zip(&fixture.objects) {
            for (name, value) in &object.attrs {
                let def = world
                    .fixture_attr(obj, name)
                    .ok_or_else(|| FixtureError::UnknownAttribute(obj, name.clone()))?;
                world.set_attr(obj, &def, value)?;
            }
        }

        for (obj, object) in ids.iter().copied().zip(&fixture.objects) {
            if object.flags.contains(&ObjFlag::Going) {
                warn!(?obj, "fixture object is marked destroyed");
            }
        }
        info!(objects = world.len(), "world loaded");
        Ok(world)
    }

    fn fixture_attr(&self, obj: Obj, name: &str) -> Option<AttrDef> {
        if let Some((target, attr)) = name.split_once('.')
            && let Ok(definer) = Obj::try_from(target)
        {
            return self.defined_on(definer, attr);
        }
        crate::builtins::builtin_def(name).or_else(|| self.find_def(obj, name))
    }
}
