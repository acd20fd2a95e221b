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

//! The checks other commands make before letting a player do something, and setting the locks
//! those checks read.

use crate::config::KernelConfig;
use crate::env::Notifier;
use crate::eval::{LockError, LockEvaluator};
use muse_common::matching::DefaultObjectNameMatcher;
use muse_common::model::{AttrFlag, ObjFlag, ObjType};
use muse_compiler::compile;
use muse_db::{AttrDef, World};
use muse_var::{NOTHING, Obj, SYSTEM_OBJECT};
use tracing::{debug, info};

/// How far up the location chain a zone is looked for.
const MAX_ZONE_DEPTH: usize = 10;

/// The zone `obj` is in: the first zone found walking out through its locations. Rooms and
/// things without one of their own belong to the global zone, which is the zone of #0.
#[must_use]
pub fn zone_of(world: &World, obj: Obj) -> Obj {
    let global = world.record_any(SYSTEM_OBJECT).map_or(NOTHING, |r| r.zone());
    let mut current = obj;
    for _ in 0..MAX_ZONE_DEPTH {
        if current == NOTHING {
            break;
        }
        let Ok(record) = world.record(current) else {
            break;
        };
        if current == global {
            return global;
        }
        if record.zone() != NOTHING {
            return record.zone();
        }
        if matches!(record.obj_type(), ObjType::Thing | ObjType::Room) && current != SYSTEM_OBJECT
        {
            return global;
        }
        current = record.location();
    }
    global
}

/// Whether `player` gets past the lock in `lock` on `thing`.
///
/// Some things can never be used whatever their lock says: exits that go nowhere, objects that
/// are nowhere, and keys when the one trying is itself a thing.
#[must_use]
pub fn could_doit(evaluator: &LockEvaluator<'_>, player: Obj, thing: Obj, lock: &AttrDef) -> bool {
    let world = evaluator.world();
    let (Ok(player_rec), Ok(thing_rec)) = (world.record(player), world.record(thing)) else {
        return false;
    };
    if player_rec.obj_type() == ObjType::Thing
        && thing_rec.obj_type() == ObjType::Thing
        && thing_rec.has_flag(ObjFlag::Key)
    {
        return false;
    }
    match thing_rec.obj_type() {
        ObjType::Exit if thing_rec.link() == NOTHING => return false,
        ObjType::Player | ObjType::Channel | ObjType::Universe | ObjType::Thing
            if thing_rec.location() == NOTHING =>
        {
            return false;
        }
        _ => {}
    }
    evaluator.evaluate_attr(player, thing, lock, zone_of(world, player))
}

/// Compile `text` for `player` and store it as `lock` on `thing`. An empty `text` unlocks.
///
/// Nothing is stored unless `player` controls `thing`, `lock` holds locks, and the text
/// compiles. Either way `player` is told what happened.
pub fn set_lock(
    world: &mut World,
    notifier: &dyn Notifier,
    config: &KernelConfig,
    player: Obj,
    thing: Obj,
    lock: &AttrDef,
    text: &str,
) -> Result<(), LockError> {
    let result = store_lock(world, notifier, config, player, thing, lock, text);
    match &result {
        Ok(true) => notifier.notify(player, "Locked."),
        Ok(false) => notifier.notify(player, "Unlocked."),
        Err(e) => notifier.notify(player, &e.to_string()),
    }
    result.map(|_| ())
}

fn store_lock(
    world: &mut World,
    notifier: &dyn Notifier,
    config: &KernelConfig,
    player: Obj,
    thing: Obj,
    lock: &AttrDef,
    text: &str,
) -> Result<bool, LockError> {
    world.record(thing)?;
    if !lock.has_flag(AttrFlag::Lock) {
        return Err(LockError::NotALock(lock.name().to_string()));
    }
    if !world.controls(player, thing) {
        return Err(LockError::PermissionDenied);
    }

    let compiled = {
        let matcher = DefaultObjectNameMatcher::new(&*world);
        compile(world, &matcher, player, text, config.buffer_len)?
    };
    for warning in &compiled.warnings {
        notifier.notify(player, warning);
    }

    world.set_attr(thing, lock, &compiled.text)?;
    world.touch(thing)?;
    if compiled.text.is_empty() {
        info!(?player, ?thing, lock = lock.name(), "unlocked");
    } else {
        debug!(?player, ?thing, lock = lock.name(), text = %compiled.text, "locked");
    }
    Ok(!compiled.text.is_empty())
}
