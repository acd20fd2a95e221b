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

use crate::model::WorldStateError;
use muse_var::Obj;

pub mod match_env;
#[doc(hidden)]
pub mod mock_matching_env;

pub use match_env::DefaultObjectNameMatcher;

/// Outcome of resolving a name to an object.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MatchResult {
    Found(Obj),
    NotFound,
    /// More than one candidate matched equally well.
    Ambiguous(Vec<Obj>),
}

impl MatchResult {
    /// The matched object, if there was exactly one.
    #[must_use]
    pub fn found(&self) -> Option<Obj> {
        match self {
            Self::Found(o) => Some(*o),
            _ => None,
        }
    }
}

/// This is the interface that the matching code needs to be able to call into the world state.
/// Separated out so can be more easily mocked.
pub trait MatchEnvironment {
    // Test whether a given object is valid in this environment.
    fn obj_valid(&self, oid: &Obj) -> Result<bool, WorldStateError>;

    // Return the name and all aliases for an object.
    fn get_names(&self, oid: &Obj) -> Result<Vec<String>, WorldStateError>;

    // Exits of the actor's location, the location's contents, then the actor's own contents.
    fn get_surroundings(&self, actor: &Obj) -> Result<Vec<Obj>, WorldStateError>;

    // Return the location of a given object.
    fn location_of(&self, oid: &Obj) -> Result<Obj, WorldStateError>;

    // Look a player up by exact name, anywhere.
    fn find_player(&self, name: &str) -> Result<Option<Obj>, WorldStateError>;
}

impl<T: MatchEnvironment + ?Sized> MatchEnvironment for &T {
    fn obj_valid(&self, oid: &Obj) -> Result<bool, WorldStateError> {
        (**self).obj_valid(oid)
    }

    fn get_names(&self, oid: &Obj) -> Result<Vec<String>, WorldStateError> {
        (**self).get_names(oid)
    }

    fn get_surroundings(&self, actor: &Obj) -> Result<Vec<Obj>, WorldStateError> {
        (**self).get_surroundings(actor)
    }

    fn location_of(&self, oid: &Obj) -> Result<Obj, WorldStateError> {
        (**self).location_of(oid)
    }

    fn find_player(&self, name: &str) -> Result<Option<Obj>, WorldStateError> {
        (**self).find_player(name)
    }
}

/// Resolves object names as typed by (or on behalf of) `actor`.
pub trait ObjectNameMatcher {
    fn match_object(&self, actor: Obj, name: &str) -> Result<MatchResult, WorldStateError>;
}
