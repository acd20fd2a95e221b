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

use crate::attrs::AttrDef;
use crate::builtins::Builtin;
use crate::world::World;
use muse_common::model::{AttrFlag, ObjFlag};
use muse_var::{Obj, ROOT};

/// Decides whether a viewer may read an attribute on an object.
pub trait AttrVisibility {
    fn can_see(&self, viewer: Obj, obj: Obj, def: &AttrDef) -> bool;
}

impl AttrVisibility for World {
    fn can_see(&self, viewer: Obj, obj: Obj, def: &AttrDef) -> bool {
        if def.key() == Builtin::Password.def().key() {
            return viewer == ROOT;
        }
        let Ok(record) = self.record(obj) else {
            return false;
        };
        if !def.has_flag(AttrFlag::Osee)
            && !self.controls(viewer, obj)
            && !record.has_flag(ObjFlag::SeeOk)
        {
            return false;
        }
        if def.has_flag(AttrFlag::Dark) {
            return if def.is_builtin() {
                self.is_wizard(viewer)
            } else {
                self.controls(viewer, def.definer())
            };
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_common::model::ObjType;
    use muse_common::util::BitEnum;
    use muse_var::NOTHING;

    fn setup() -> (World, Obj, Obj, Obj) {
        let mut world = World::default();
        let room = world
            .create_object("Hall", ObjType::Room, NOTHING, NOTHING)
            .unwrap();
        let root = world
            .create_object("Root", ObjType::Player, NOTHING, room)
            .unwrap();
        assert_eq!(root, ROOT);
        let owner = world
            .create_object("Owner", ObjType::Player, NOTHING, room)
            .unwrap();
        let stranger = world
            .create_object("Stranger", ObjType::Player, NOTHING, room)
            .unwrap();
        (world, root, owner, stranger)
    }

    #[test]
    fn test_osee_and_private() {
        let (mut world, _, owner, stranger) = setup();
        let thing = world
            .create_object("thing", ObjType::Thing, owner, owner)
            .unwrap();
        assert!(world.can_see(stranger, thing, &Builtin::Desc.def()));
        assert!(!world.can_see(stranger, thing, &Builtin::Lock.def()));
        assert!(world.can_see(owner, thing, &Builtin::Lock.def()));

        world.set_flag(thing, ObjFlag::SeeOk, true).unwrap();
        assert!(world.can_see(stranger, thing, &Builtin::Lock.def()));
    }

    #[test]
    fn test_password_only_for_root() {
        let (world, root, owner, _) = setup();
        let password = Builtin::Password.def();
        assert!(world.can_see(root, owner, &password));
        assert!(!world.can_see(owner, owner, &password));
    }

    #[test]
    fn test_dark_user_definition() {
        let (mut world, _, owner, stranger) = setup();
        let thing = world
            .create_object("thing", ObjType::Thing, owner, owner)
            .unwrap();
        world.set_flag(thing, ObjFlag::SeeOk, true).unwrap();
        let hidden = world
            .define_attr(
                thing,
                "HIDDEN",
                [AttrFlag::Dark, AttrFlag::Osee].into_iter().collect::<BitEnum<_>>(),
            )
            .unwrap()
            .def()
            .clone();
        assert!(world.can_see(owner, thing, &hidden));
        assert!(!world.can_see(stranger, thing, &hidden));
    }
}
