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

use std::fmt::{Display, Formatter};

/// How a bare object reference is tested against the actor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RefKind {
    /// `=obj`: the actor is the object.
    Is,
    /// `+obj`: the actor carries the object.
    Carry,
    /// `obj`: either of the above, or the object is the zone.
    Any,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LockExpr {
    /// Two or more alternatives, in the order written.
    Or(Vec<LockExpr>),
    /// Two or more conjuncts, in the order written.
    And(Vec<LockExpr>),
    Not(Box<LockExpr>),
    /// A numeric literal; true when non-zero.
    Number(i64),
    /// `attr:pattern` against the actor's attributes.
    AttrTest { name: String, pattern: String },
    Ref { kind: RefKind, name: String },
    /// `@obj`: pass `obj`'s lock, if it may be seen.
    Indirect(String),
    /// `@(obj)`: pass `obj`'s lock, whether it may be seen or not.
    IndirectLock(String),
    /// `@(obj=attr:pattern)`. A missing `attr:pattern` part never passes.
    IndirectAttr {
        target: String,
        test: Option<(String, String)>,
    },
    /// Groups and negations nested past [`MAX_NESTING`](crate::MAX_NESTING). Never passes.
    TooDeep,
}

impl LockExpr {
    /// `terms` joined by `|`, or the single term itself.
    pub(crate) fn or(mut terms: Vec<Self>) -> Self {
        if terms.len() == 1 {
            return terms.swap_remove(0);
        }
        Self::Or(terms)
    }

    /// `terms` joined by `&`, or the single term itself.
    pub(crate) fn and(mut terms: Vec<Self>) -> Self {
        if terms.len() == 1 {
            return terms.swap_remove(0);
        }
        Self::And(terms)
    }

    pub(crate) fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }
}

/// Canonical text. Groups are always parenthesized so the result parses back to the same tree.
impl Display for LockExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Or(terms) => write_group(f, terms, '|'),
            Self::And(terms) => write_group(f, terms, '&'),
            Self::Not(e) => write!(f, "!{e}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::AttrTest { name, pattern } => write!(f, "{name}:{pattern}"),
            Self::Ref { kind, name } => match kind {
                RefKind::Is => write!(f, "={name}"),
                RefKind::Carry => write!(f, "+{name}"),
                RefKind::Any => f.write_str(name),
            },
            Self::Indirect(name) => write!(f, "@{name}"),
            Self::IndirectLock(name) => write!(f, "@({name})"),
            Self::IndirectAttr { target, test } => match test {
                Some((name, pattern)) => write!(f, "@({target}={name}:{pattern})"),
                None => write!(f, "@({target}=)"),
            },
            Self::TooDeep => f.write_str("0"),
        }
    }
}

fn write_group(f: &mut Formatter<'_>, terms: &[LockExpr], op: char) -> std::fmt::Result {
    f.write_str("(")?;
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, "{op}")?;
        }
        write!(f, "{term}")?;
    }
    f.write_str(")")
}
