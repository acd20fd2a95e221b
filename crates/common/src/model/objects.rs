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

use crate::util::BitEnum;
use enum_primitive_derive::Primitive;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum::{EnumIter, IntoEnumIterator};

/// The kind of an object. Every object has exactly one.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ObjType {
    Room,
    Thing,
    Exit,
    Universe,
    Channel,
    Player,
}

impl ObjType {
    /// The single letter shown at the front of a flag string, if this type has one.
    #[must_use]
    pub fn type_code(&self) -> Option<char> {
        match self {
            Self::Room => Some('R'),
            Self::Thing => Some('T'),
            Self::Exit => Some('E'),
            Self::Universe => Some('U'),
            Self::Channel => None,
            Self::Player => Some('P'),
        }
    }
}

impl Display for ObjType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Room => "Room",
            Self::Thing => "Thing",
            Self::Exit => "Exit",
            Self::Universe => "Universe",
            Self::Channel => "Channel",
            Self::Player => "Player",
        };
        f.write_str(name)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Primitive,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ObjFlag {
    ChownOk = 0,
    Dark = 1,
    Sticky = 2,
    Haven = 3,
    InheritPowers = 4,
    /// Tombstone: the object has been destroyed and its slot is awaiting reuse.
    Going = 5,
    Puppet = 6,
    LinkOk = 7,
    EnterOk = 8,
    SeeOk = 9,
    Connect = 10,
    Opaque = 11,
    Quiet = 12,
    Bearing = 13,
    /// Things only: a key, which puppets may not pick up.
    Key = 14,
    /// Rooms only: anyone may teleport here.
    JumpOk = 15,
    /// Holder has full administrative power.
    Wizard = 16,
}

impl ObjFlag {
    #[must_use]
    pub fn letter(&self, obj_type: ObjType) -> char {
        match self {
            Self::ChownOk => 'C',
            Self::Dark => 'D',
            Self::Sticky => 'S',
            Self::Haven => 'H',
            Self::InheritPowers => 'I',
            Self::Going => 'G',
            Self::Puppet => 'p',
            Self::LinkOk => 'L',
            Self::EnterOk => 'e',
            Self::SeeOk => 'v',
            Self::Connect => 'c',
            Self::Opaque if obj_type == ObjType::Exit => 'T',
            Self::Opaque => 'o',
            Self::Quiet => 'q',
            Self::Bearing => 'b',
            Self::Key => 'K',
            Self::JumpOk => 'J',
            Self::Wizard => 'W',
        }
    }

    #[must_use]
    pub fn long_name(&self) -> &'static str {
        match self {
            Self::ChownOk => "Chown_ok",
            Self::Dark => "Dark",
            Self::Sticky => "Sticky",
            Self::Haven => "Haven",
            Self::InheritPowers => "Inherit",
            Self::Going => "Going",
            Self::Puppet => "Puppet",
            Self::LinkOk => "Link_ok",
            Self::EnterOk => "Enter_ok",
            Self::SeeOk => "Visible",
            Self::Connect => "Connected",
            Self::Opaque => "Opaque",
            Self::Quiet => "Quiet",
            Self::Bearing => "Bearing",
            Self::Key => "Key",
            Self::JumpOk => "Jump_ok",
            Self::Wizard => "Wizard",
        }
    }
}

/// Short flag string: the type letter followed by one letter per set flag.
/// A destroyed object shows only `G`.
#[must_use]
pub fn flags_string(obj_type: ObjType, flags: BitEnum<ObjFlag>) -> String {
    if flags.contains(ObjFlag::Going) {
        return "G".to_string();
    }
    obj_type
        .type_code()
        .into_iter()
        .chain(
            ObjFlag::iter()
                .filter(|f| flags.contains(*f))
                .map(|f| f.letter(obj_type)),
        )
        .collect()
}

/// Long, human readable description of type and flags.
#[must_use]
pub fn flags_description(obj_type: ObjType, flags: BitEnum<ObjFlag>) -> String {
    let names: Vec<_> = ObjFlag::iter()
        .filter(|f| flags.contains(*f))
        .map(|f| f.long_name())
        .collect();
    if names.is_empty() {
        format!("Type: {obj_type}")
    } else {
        format!("Type: {obj_type} Flags: {}", names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_string() {
        let flags = BitEnum::new_with(ObjFlag::Dark) | ObjFlag::Sticky;
        assert_eq!(flags_string(ObjType::Thing, flags), "TDS");
        assert_eq!(flags_string(ObjType::Channel, BitEnum::new()), "");
        assert_eq!(
            flags_string(ObjType::Exit, BitEnum::new_with(ObjFlag::Opaque)),
            "ET"
        );
        assert_eq!(
            flags_string(ObjType::Player, BitEnum::new_with(ObjFlag::Going)),
            "G"
        );
    }

    #[test]
    fn test_flags_description() {
        assert_eq!(
            flags_description(ObjType::Room, BitEnum::new()),
            "Type: Room"
        );
        assert_eq!(
            flags_description(ObjType::Player, BitEnum::new_with(ObjFlag::Wizard)),
            "Type: Player Flags: Wizard"
        );
    }
}
