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

/// Why a lock could not be compiled. The display text is what the player is told.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CompileError {
    #[error("I don't see {0:?} here.")]
    NoMatch(String),
    #[error("I don't know which {0:?} you mean!")]
    AmbiguousMatch(String),
    #[error("I don't understand that key.")]
    MissingColon,
    #[error("Invalid acting object {0}")]
    InvalidActor(Obj),
}
