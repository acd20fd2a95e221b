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

use muse_var::Obj;
use thiserror::Error;

/// Errors related to the world state and operations on it.
#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum WorldStateError {
    #[error("Object not found: {0}")]
    ObjectNotFound(Obj),
    #[error("Recursive move detected: {0} -> {1}")]
    RecursiveMove(Obj, Obj),
    #[error("Recursive parent detected: {0} -> {1}")]
    RecursiveParent(Obj, Obj),
    #[error("Object permission denied")]
    ObjectPermissionDenied,

    #[error("Illegal attribute name: {0:?}")]
    IllegalAttributeName(String),
    #[error("Attribute definition not found: {0}.{1}")]
    AttributeDefinitionNotFound(Obj, String),
    #[error("Attribute {1} would shadow an existing definition on {0}")]
    AttributeShadows(Obj, String),
    #[error("Too many attribute definitions on {0}")]
    TooManyAttributeDefinitions(Obj),
    #[error("Built in attribute {0} cannot be changed")]
    BuiltinAttribute(String),

    #[error("Failed object match: {0}")]
    FailedMatch(String),
    #[error("Ambiguous object match: {0}")]
    AmbiguousMatch(String),
}
