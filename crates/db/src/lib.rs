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

//! The world: an object table with flags, containment and multiple inheritance, plus the
//! attribute store that locks read from.

pub use attrs::{AttrDef, AttrKey, AttrValue};
pub use builtins::{Builtin, builtin_def};
pub use config::{DEFAULT_MAX_ATTR_DEFS, DatabaseConfig};
pub use defs::{AttrDefRegistry, DefineOutcome, ok_attribute_name};
pub use loader::{FixtureError, ObjectFixture, WorldFixture};
pub use visibility::AttrVisibility;
pub use world::{ObjectRecord, World};

mod attr_cache;
mod attrs;
mod builtins;
mod config;
mod defs;
mod loader;
mod resolver;
mod visibility;
mod world;
