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

//! Turning an attribute name, as typed by a player, into a definition.

use crate::attrs::AttrDef;
use crate::builtins::builtin_def;
use crate::world::World;
use ahash::AHashSet;
use muse_common::matching::{DefaultObjectNameMatcher, MatchResult, ObjectNameMatcher};
use muse_var::{NOTHING, Obj};
use tracing::trace;

impl World {
    /// Whether `thing` is `parent` or descends from it. Everything "is a" `NOTHING`'s child, so
    /// `is_a(NOTHING, x)` holds for any `x`. Cycles in the parent graph are tolerated.
    #[must_use]
    pub fn is_a(&self, thing: Obj, parent: Obj) -> bool {
        if thing == NOTHING {
            return true;
        }
        let mut visited = AHashSet::new();
        let mut stack = vec![thing];
        while let Some(current) = stack.pop() {
            if current == parent {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Ok(record) = self.record_any(current) {
                stack.extend(record.parents.iter().rev());
            }
        }
        false
    }

    /// Every ancestor of `obj`, nearest first in depth-first order, each listed once.
    #[must_use]
    pub fn ancestors(&self, obj: Obj) -> Vec<Obj> {
        let mut visited = AHashSet::new();
        visited.insert(obj);
        let mut result = vec![];
        let mut stack: Vec<Obj> = self
            .record_any(obj)
            .map(|r| r.parents.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);
            if let Ok(record) = self.record_any(current) {
                stack.extend(record.parents.iter().rev());
            }
        }
        result
    }

    /// Resolve `name` for `actor` in the context of `context`, using the world's own name
    /// matcher for `object.attr` forms.
    #[must_use]
    pub fn resolve_attr(&self, actor: Obj, context: Obj, name: &str) -> Option<AttrDef> {
        let matcher = DefaultObjectNameMatcher::new(self);
        self.resolve_attr_with(&matcher, actor, context, name)
    }

    /// Resolve `name`. The first of these to succeed wins:
    ///
    /// 1. `.attr`: the builtin `attr`.
    /// 2. `target.attr`: `target` matched relative to `actor`, then `attr` among the definitions
    ///    `target` declares itself.
    /// 3. A definition found in `actor`'s ancestry, provided `context` is-a its declarer.
    /// 4. A builtin.
    /// 5. A definition found in `context`'s own ancestry.
    pub fn resolve_attr_with(
        &self,
        matcher: &dyn ObjectNameMatcher,
        actor: Obj,
        context: Obj,
        name: &str,
    ) -> Option<AttrDef> {
        if let Some((target, attr)) = name.split_once('.') {
            if target.is_empty() {
                return builtin_def(attr);
            }
            let matched = matcher.match_object(actor, target).ok();
            if let Some(MatchResult::Found(target)) = matched
                && let Some(def) = self.defined_on(target, attr)
            {
                trace!(?actor, name, ?target, "resolved dotted attribute");
                return Some(def);
            }
        }

        if self.valid(actor)
            && let Some(def) = self.find_def(actor, name)
            && self.is_a(context, def.definer())
        {
            return Some(def);
        }

        if let Some(def) = builtin_def(name) {
            return Some(def);
        }

        if self.valid(context) {
            return self.find_def(context, name);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::builtins::Builtin;
    use crate::world::World;
    use muse_common::model::{AttrFlag, ObjType};
    use muse_common::util::BitEnum;
    use muse_var::{NOTHING, Obj};
    use pretty_assertions::assert_eq;

    struct Setup {
        world: World,
        room: Obj,
        player: Obj,
        proto: Obj,
        widget: Obj,
    }

    fn setup() -> Setup {
        let mut world = World::default();
        let room = world
            .create_object("Hall", ObjType::Room, NOTHING, NOTHING)
            .unwrap();
        let player = world
            .create_object("Alice", ObjType::Player, NOTHING, room)
            .unwrap();
        let proto = world
            .create_object("proto", ObjType::Thing, player, room)
            .unwrap();
        let widget = world
            .create_object("widget", ObjType::Thing, player, room)
            .unwrap();
        world.add_parent(widget, proto).unwrap();
        Setup {
            world,
            room,
            player,
            proto,
            widget,
        }
    }

    #[test]
    fn test_is_a() {
        let Setup {
            world,
            proto,
            widget,
            room,
            ..
        } = setup();
        assert!(world.is_a(widget, proto));
        assert!(world.is_a(widget, widget));
        assert!(!world.is_a(proto, widget));
        assert!(!world.is_a(widget, room));
        assert!(world.is_a(NOTHING, room));
    }

    #[test]
    fn test_builtin_forms() {
        let Setup { world, player, .. } = setup();
        assert_eq!(
            world.resolve_attr(player, NOTHING, "lock"),
            Some(Builtin::Lock.def())
        );
        assert_eq!(
            world.resolve_attr(player, NOTHING, ".Desc"),
            Some(Builtin::Desc.def())
        );
        assert_eq!(world.resolve_attr(player, NOTHING, "nonesuch"), None);
    }

    #[test]
    fn test_dotted_uses_target_local_defs() {
        let Setup {
            mut world,
            player,
            proto,
            widget,
            ..
        } = setup();
        world
            .define_attr(proto, "COLOR", BitEnum::new_with(AttrFlag::Inherit))
            .unwrap();

        let def = world.resolve_attr(player, NOTHING, "proto.color").unwrap();
        assert_eq!(def.definer(), proto);
        // Only the target's own declarations count for the dotted form.
        assert_eq!(world.resolve_attr(player, NOTHING, "widget.color"), None);
        assert_eq!(
            world.resolve_attr(player, NOTHING, &format!("{widget}.color")),
            None
        );
    }

    #[test]
    fn test_actor_ancestry_requires_context_is_a() {
        let Setup {
            mut world,
            player,
            proto,
            widget,
            room,
        } = setup();
        world.add_parent(player, proto).unwrap();
        world.define_attr(proto, "COLOR", BitEnum::new()).unwrap();

        // The actor can see the definition and the context descends from its declarer.
        assert_eq!(
            world.resolve_attr(player, widget, "COLOR").unwrap().definer(),
            proto
        );
        // The room does not descend from proto, and has no definition of its own.
        assert_eq!(world.resolve_attr(player, room, "COLOR"), None);
        // The context's own ancestry is the last resort.
        assert_eq!(
            world.resolve_attr(room, widget, "COLOR").unwrap().definer(),
            proto
        );
    }

    #[test]
    fn test_cyclic_parents_terminate() {
        let Setup {
            mut world,
            proto,
            widget,
            room,
            ..
        } = setup();
        // Build a cycle behind the back of add_parent's check.
        world.record_mut(proto).unwrap().parents.push(widget);
        world.record_mut(widget).unwrap().children.push(proto);

        assert!(!world.is_a(widget, room));
        assert_eq!(world.ancestors(widget), vec![proto]);
        assert_eq!(world.find_def(widget, "COLOR"), None);

        let def = world
            .define_attr(room, "COLOR", BitEnum::new_with(AttrFlag::Inherit))
            .unwrap()
            .def()
            .clone();
        assert_eq!(world.get_attr(widget, &def), "");
    }
}
