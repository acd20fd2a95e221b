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

//! The server's built in attributes.
//!
//! Some are ordinary stored attributes with fixed names and flags (`Lock`, `Desc`, ...). The
//! rest are computed on read from the object record, through the accessor in their table entry.

use crate::attrs::{AttrDef, AttrKey};
use crate::world::{ObjectRecord, World};
use ahash::AHashMap;
use lazy_static::lazy_static;
use muse_common::model::{AttrFlag, ObjType, flags_description, flags_string};
use muse_common::util::BitEnum;
use muse_var::{NOTHING, Obj};
use strum::{EnumIter, IntoEnumIterator};

type Accessor = fn(&World, Obj, &ObjectRecord) -> String;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter)]
#[repr(u16)]
pub enum Builtin {
    Osucc = 1,
    Ofail = 2,
    Fail = 3,
    Succ = 4,
    Password = 5,
    Desc = 6,
    Sex = 7,
    Odrop = 8,
    Drop = 9,
    Lock = 10,
    Elock = 11,
    Ulock = 12,
    Slock = 13,
    Alias = 14,
    Pennies = 15,
    Idesc = 16,
    Away = 17,
    Idle = 18,
    Enter = 19,
    Oenter = 20,

    Location = 100,
    Owner = 101,
    Link = 102,
    Parents = 103,
    Children = 104,
    Contents = 105,
    Exits = 106,
    Name = 107,
    Flags = 108,
    LongFlags = 109,
    Zone = 110,
    Next = 111,
    Modified = 112,
    Created = 113,
}

struct BuiltinAttr {
    name: &'static str,
    flags: &'static [AttrFlag],
    accessor: Option<Accessor>,
}

const COMPUTED: &[AttrFlag] = &[AttrFlag::Builtin, AttrFlag::Osee, AttrFlag::Wizard];
const COMPUTED_DBREF: &[AttrFlag] = &[
    AttrFlag::Builtin,
    AttrFlag::Osee,
    AttrFlag::Wizard,
    AttrFlag::Dbref,
];
const COMPUTED_DATE: &[AttrFlag] = &[
    AttrFlag::Builtin,
    AttrFlag::Osee,
    AttrFlag::Wizard,
    AttrFlag::Date,
];

fn dbref_list(objs: &[Obj]) -> String {
    objs.iter()
        .map(Obj::to_literal)
        .collect::<Vec<_>>()
        .join(" ")
}

fn next_sibling(world: &World, obj: Obj, record: &ObjectRecord) -> String {
    let Ok(location) = world.record_any(record.location) else {
        return NOTHING.to_literal();
    };
    let siblings = if record.obj_type == ObjType::Exit {
        &location.exits
    } else {
        &location.contents
    };
    siblings
        .iter()
        .skip_while(|o| **o != obj)
        .nth(1)
        .copied()
        .unwrap_or(NOTHING)
        .to_literal()
}

fn stored(name: &'static str, flags: &'static [AttrFlag]) -> BuiltinAttr {
    BuiltinAttr {
        name,
        flags,
        accessor: None,
    }
}

fn computed(name: &'static str, flags: &'static [AttrFlag], accessor: Accessor) -> BuiltinAttr {
    BuiltinAttr {
        name,
        flags,
        accessor: Some(accessor),
    }
}

impl Builtin {
    fn attr(&self) -> BuiltinAttr {
        match self {
            Self::Osucc => stored("Osucc", &[AttrFlag::Osee]),
            Self::Ofail => stored("Ofail", &[AttrFlag::Osee]),
            Self::Fail => stored("Fail", &[AttrFlag::Osee]),
            Self::Succ => stored("Succ", &[AttrFlag::Osee]),
            Self::Password => stored(
                "Password",
                &[AttrFlag::Wizard, AttrFlag::Dark, AttrFlag::NoMod],
            ),
            Self::Desc => stored("Desc", &[AttrFlag::Osee]),
            Self::Sex => stored("Sex", &[AttrFlag::Osee]),
            Self::Odrop => stored("Odrop", &[AttrFlag::Osee]),
            Self::Drop => stored("Drop", &[AttrFlag::Osee]),
            Self::Lock => stored("Lock", &[AttrFlag::Lock]),
            Self::Elock => stored("Elock", &[AttrFlag::Lock]),
            Self::Ulock => stored("Ulock", &[AttrFlag::Lock]),
            Self::Slock => stored("Slock", &[AttrFlag::Lock]),
            Self::Alias => stored("Alias", &[AttrFlag::Osee]),
            Self::Pennies => stored("Pennies", &[AttrFlag::Wizard]),
            Self::Idesc => stored("Idesc", &[]),
            Self::Away => stored("Away", &[]),
            Self::Idle => stored("Idle", &[]),
            Self::Enter => stored("Enter", &[AttrFlag::Osee]),
            Self::Oenter => stored("Oenter", &[AttrFlag::Osee]),

            Self::Location => computed("Location", COMPUTED_DBREF, |_, _, r| {
                r.location.to_literal()
            }),
            Self::Owner => computed("Owner", COMPUTED_DBREF, |_, _, r| r.owner.to_literal()),
            Self::Link => computed("Link", COMPUTED_DBREF, |_, _, r| r.link.to_literal()),
            Self::Parents => computed("Parents", COMPUTED, |_, _, r| dbref_list(&r.parents)),
            Self::Children => computed("Children", COMPUTED, |_, _, r| dbref_list(&r.children)),
            Self::Contents => computed("Contents", COMPUTED, |_, _, r| dbref_list(&r.contents)),
            Self::Exits => computed("Exits", COMPUTED, |_, _, r| dbref_list(&r.exits)),
            Self::Name => computed("Name", COMPUTED, |_, _, r| r.name.clone()),
            Self::Flags => computed("Flags", COMPUTED, |_, _, r| {
                flags_string(r.obj_type, r.flags)
            }),
            Self::LongFlags => computed("LongFlags", COMPUTED, |_, _, r| {
                flags_description(r.obj_type, r.flags)
            }),
            Self::Zone => computed("Zone", COMPUTED_DBREF, |_, _, r| r.zone.to_literal()),
            Self::Next => computed("Next", COMPUTED_DBREF, next_sibling),
            Self::Modified => computed("Modified", COMPUTED_DATE, |_, _, r| {
                r.modified.to_string()
            }),
            Self::Created => computed("Created", COMPUTED_DATE, |_, _, r| {
                r.created.to_string()
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> u16 {
        *self as u16
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.attr().name
    }

    #[must_use]
    pub fn def(self) -> AttrDef {
        let attr = self.attr();
        AttrDef {
            key: AttrKey::Builtin(self.id()),
            name: attr.name.to_string(),
            flags: attr.flags.iter().copied().collect::<BitEnum<_>>(),
            definer: NOTHING,
        }
    }

    #[must_use]
    pub fn from_id(id: u16) -> Option<Self> {
        BY_ID.get(&id).copied()
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(&name.to_ascii_lowercase()).copied()
    }

    /// Evaluate a computed builtin against an object record. Stored builtins and unknown numbers
    /// give `???`.
    pub(crate) fn compute(id: u16, world: &World, obj: Obj, record: &ObjectRecord) -> String {
        match Self::from_id(id).and_then(|b| b.attr().accessor) {
            Some(accessor) => accessor(world, obj, record),
            None => "???".to_string(),
        }
    }
}

lazy_static! {
    static ref BY_ID: AHashMap<u16, Builtin> = Builtin::iter().map(|b| (b.id(), b)).collect();
    static ref BY_NAME: AHashMap<String, Builtin> = Builtin::iter()
        .map(|b| (b.name().to_ascii_lowercase(), b))
        .collect();
}

/// Definition for a builtin name, if there is one.
#[must_use]
pub fn builtin_def(name: &str) -> Option<AttrDef> {
    Builtin::from_name(name).map(Builtin::def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("lock", Some(Builtin::Lock); "lowercase")]
    #[test_case("LOCATION", Some(Builtin::Location); "uppercase")]
    #[test_case("LongFlags", Some(Builtin::LongFlags); "mixed case")]
    #[test_case("NoSuchThing", None; "unknown")]
    fn test_from_name(name: &str, expected: Option<Builtin>) {
        assert_eq!(Builtin::from_name(name), expected);
    }

    #[test]
    fn test_ids_round_trip() {
        for b in Builtin::iter() {
            assert_eq!(Builtin::from_id(b.id()), Some(b));
        }
        assert_eq!(Builtin::from_id(9999), None);
    }

    #[test]
    fn test_defs() {
        let lock = Builtin::Lock.def();
        assert!(lock.has_flag(AttrFlag::Lock));
        assert!(!lock.is_computed());
        assert_eq!(lock.definer(), NOTHING);

        let loc = Builtin::Location.def();
        assert!(loc.is_computed());
        assert!(loc.has_flag(AttrFlag::Dbref));

        assert!(Builtin::Password.def().has_flag(AttrFlag::Dark));
    }
}
