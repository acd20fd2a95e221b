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

//! The lock expression language: tokenizing, parsing to an AST, and the compile/decompile pair
//! that moves locks between the form players type and the form that is stored.

mod ast;
mod compile;
mod decompile;
mod errors;
pub mod lexer;
mod parse;

pub use crate::ast::{LockExpr, RefKind};
pub use crate::compile::{CompiledLock, compile};
pub use crate::decompile::decompile;
pub use crate::errors::CompileError;
pub use crate::parse::{MAX_NESTING, parse_lock};
