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

//! Lock evaluation: expanding function calls, walking the parsed lock against the world, and the
//! lock checks and lock setting the rest of the server calls into.

pub use crate::config::{DEFAULT_MAX_LOCK_DEPTH, KernelConfig};
pub use crate::env::{
    FunctionEvaluator, FunctionOutput, Notifier, PassthroughEvaluator, RecordingNotifier,
    TracingNotifier,
};
pub use crate::eval::{LockError, LockEvaluator};
pub use crate::expand::expand;
pub use crate::gates::{could_doit, set_lock, zone_of};

pub mod config;
mod env;
mod eval;
mod expand;
mod gates;
