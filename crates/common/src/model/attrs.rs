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
use strum::{EnumIter, IntoEnumIterator};

/// Flags carried by an attribute definition. Discriminants are bit positions.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Primitive, EnumIter,
)]
pub enum AttrFlag {
    /// Players other than the owner can see it.
    Osee = 0,
    /// No one can see it.
    Dark = 1,
    /// Only wizards can change it.
    Wizard = 2,
    /// Not saved with the database.
    Unsaved = 3,
    /// Not even wizards may modify it.
    NoMod = 4,
    /// Value is a date in seconds since the epoch.
    Date = 5,
    /// Value is inherited by children.
    Inherit = 6,
    /// Value is a compiled lock expression.
    Lock = 7,
    /// Value is a user-defined function.
    Function = 8,
    /// The server supplies the value from object fields; nothing is stored.
    Builtin = 10,
    /// Value is displayed as a dbref.
    Dbref = 11,
    /// Not counted against memory quotas.
    NoMem = 12,
    /// Value is a length of time.
    Time = 13,
    Haven = 14,
}

impl AttrFlag {
    /// The option word used when declaring attributes, if this flag can be given by users.
    #[must_use]
    pub fn option_name(&self) -> Option<&'static str> {
        let name = match self {
            Self::Wizard => "wizard",
            Self::Osee => "osee",
            Self::Dark => "dark",
            Self::Inherit => "inherit",
            Self::Unsaved => "unsaved",
            Self::Date => "date",
            Self::Lock => "lock",
            Self::Function => "function",
            Self::Dbref => "dbref",
            Self::Haven => "haven",
            Self::NoMod | Self::Builtin | Self::NoMem | Self::Time => return None,
        };
        Some(name)
    }

    /// Parse a single declaration option word, case-insensitively.
    #[must_use]
    pub fn parse_option(word: &str) -> Option<Self> {
        Self::iter().find(|f| {
            f.option_name()
                .is_some_and(|name| name.eq_ignore_ascii_case(word))
        })
    }

    /// Parse a whitespace separated option list. Unknown words are returned separately so the
    /// caller can report them without rejecting the whole declaration.
    #[must_use]
    pub fn parse_options(options: &str) -> (BitEnum<AttrFlag>, Vec<String>) {
        let mut flags = BitEnum::new();
        let mut unknown = vec![];
        for word in options.split_whitespace() {
            match Self::parse_option(word) {
                Some(flag) => flags.set(flag),
                None => unknown.push(word.to_string()),
            }
        }
        (flags, unknown)
    }
}

/// Render the user-visible options of a flag set, space separated, in declaration order.
#[must_use]
pub fn attr_flags_string(flags: BitEnum<AttrFlag>) -> String {
    AttrFlag::iter()
        .filter(|f| flags.contains(*f))
        .filter_map(|f| f.option_name())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let (flags, unknown) = AttrFlag::parse_options("inherit LOCK bogus osee");
        assert!(flags.contains(AttrFlag::Inherit));
        assert!(flags.contains(AttrFlag::Lock));
        assert!(flags.contains(AttrFlag::Osee));
        assert!(!flags.contains(AttrFlag::Dark));
        assert_eq!(unknown, vec!["bogus".to_string()]);
    }

    #[test]
    fn test_internal_flags_not_options() {
        assert_eq!(AttrFlag::parse_option("builtin"), None);
        assert_eq!(AttrFlag::parse_option("nomem"), None);
    }

    #[test]
    fn test_flags_string() {
        let flags = BitEnum::new_with(AttrFlag::Inherit) | AttrFlag::Osee | AttrFlag::Builtin;
        assert_eq!(attr_flags_string(flags), "osee inherit");
    }
}
