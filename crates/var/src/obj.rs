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

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Object #0. The global zone hangs off of it, and it is never a valid lock target to destroy.
pub const SYSTEM_OBJECT: Obj = Obj::mk_id(0);

/// The root player. Only root may see password attributes.
pub const ROOT: Obj = Obj::mk_id(1);

/// Used throughout to refer to a missing object value.
pub const NOTHING: Obj = Obj::mk_id(-1);
/// Used in matching to indicate that the match was ambiguous on multiple objects in the
/// environment.
pub const AMBIGUOUS: Obj = Obj::mk_id(-2);
/// Virtual room, represents the mover's home.
pub const HOME: Obj = Obj::mk_id(-3);

/// A reference to an object: an index into the global, append-only object table.
/// Negative values are the special references above and never name a real object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Obj(i32);

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ObjParseError {
    #[error("Expected object reference to start with '#', got {0}")]
    MissingHash(String),
    #[error("Could not parse object number: {0}")]
    BadNumber(String),
}

impl Display for Obj {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("#{}", self.0))
    }
}

impl Obj {
    pub const fn mk_id(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(&self) -> i32 {
        self.0
    }

    #[must_use]
    pub fn to_literal(&self) -> String {
        format!("#{}", self.0)
    }

    #[must_use]
    pub fn is_sysobj(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn is_nothing(&self) -> bool {
        self.0 == -1
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 >= 0
    }

    /// Index into the object table, if this is not one of the special negative references.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl TryFrom<&str> for Obj {
    type Error = ObjParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let Some(digits) = value.strip_prefix('#') else {
            return Err(ObjParseError::MissingHash(value.to_string()));
        };
        digits
            .parse::<i32>()
            .map(Self::mk_id)
            .map_err(|e| ObjParseError::BadNumber(format!("{digits}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obj() {
        let obj = Obj::mk_id(0);
        assert_eq!(obj.id(), 0);
        assert_eq!(obj.to_literal(), "#0");
        assert!(obj.is_sysobj());

        let obj = Obj::mk_id(1);
        assert_eq!(obj.to_literal(), "#1");
        assert_eq!(obj.as_index(), Some(1));

        assert_eq!(NOTHING.to_literal(), "#-1");
        assert!(NOTHING.is_nothing());
        assert_eq!(NOTHING.as_index(), None);
        assert_eq!(AMBIGUOUS.to_literal(), "#-2");

        let obj = Obj::mk_id(0x7fff_ffff);
        assert_eq!(obj.to_literal(), "#2147483647");
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Obj::try_from("#12"), Ok(Obj::mk_id(12)));
        assert_eq!(Obj::try_from("#-1"), Ok(NOTHING));
        assert!(matches!(
            Obj::try_from("12"),
            Err(ObjParseError::MissingHash(_))
        ));
        assert!(matches!(
            Obj::try_from("#twelve"),
            Err(ObjParseError::BadNumber(_))
        ));
    }
}
