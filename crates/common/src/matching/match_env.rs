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

use crate::{
    matching::{MatchEnvironment, MatchResult, ObjectNameMatcher},
    model::WorldStateError,
};
use muse_var::Obj;

const ME: &str = "me";
const HERE: &str = "here";
const PLAYER_PREFIX: char = '*';

#[derive(Clone, Eq, PartialEq, Debug, Default)]
struct MatchData {
    exact: Vec<Obj>,
    partial: Vec<Obj>,
}

fn do_match_object_names(
    oid: Obj,
    match_data: &mut MatchData,
    names: Vec<String>,
    match_name: &str,
) {
    let match_name = match_name.to_lowercase();

    for object_name in names {
        let object_name = object_name.trim().to_lowercase();
        if !object_name.starts_with(&match_name) {
            continue;
        }
        let bucket = if object_name == match_name {
            &mut match_data.exact
        } else {
            &mut match_data.partial
        };
        if !bucket.contains(&oid) {
            bucket.push(oid);
        }
    }
}

fn match_surroundings<M: MatchEnvironment>(
    env: &M,
    actor: &Obj,
    object_name: &str,
) -> Result<MatchResult, WorldStateError> {
    let mut match_data = MatchData::default();

    for oid in env.get_surroundings(actor)? {
        if !env.obj_valid(&oid)? {
            continue;
        }
        let object_names = env.get_names(&oid)?;
        do_match_object_names(oid, &mut match_data, object_names, object_name);
    }

    // Exact matches win over partial matches.
    let candidates = if match_data.exact.is_empty() {
        match_data.partial
    } else {
        match_data.exact
    };
    Ok(match candidates.as_slice() {
        [] => MatchResult::NotFound,
        [one] => MatchResult::Found(*one),
        _ => MatchResult::Ambiguous(candidates),
    })
}

/// Name matching as done for typed commands: `#n` literals, `me`, `here`, `*player`, then the
/// names and aliases of everything around the actor.
pub struct DefaultObjectNameMatcher<M: MatchEnvironment> {
    pub env: M,
}

impl<M: MatchEnvironment> DefaultObjectNameMatcher<M> {
    pub fn new(env: M) -> Self {
        Self { env }
    }
}

impl<M: MatchEnvironment> ObjectNameMatcher for DefaultObjectNameMatcher<M> {
    fn match_object(&self, actor: Obj, object_name: &str) -> Result<MatchResult, WorldStateError> {
        let object_name = object_name.trim();
        if object_name.is_empty() {
            return Ok(MatchResult::NotFound);
        }

        // Object literals only match objects that exist.
        if object_name.starts_with('#')
            && let Ok(obj) = Obj::try_from(object_name)
        {
            return Ok(if self.env.obj_valid(&obj)? {
                MatchResult::Found(obj)
            } else {
                MatchResult::NotFound
            });
        }

        if let Some(player_name) = object_name.strip_prefix(PLAYER_PREFIX) {
            return Ok(match self.env.find_player(player_name.trim())? {
                Some(player) => MatchResult::Found(player),
                None => MatchResult::NotFound,
            });
        }

        if !self.env.obj_valid(&actor)? {
            return Ok(MatchResult::NotFound);
        }

        if object_name.eq_ignore_ascii_case(ME) {
            return Ok(MatchResult::Found(actor));
        }

        if object_name.eq_ignore_ascii_case(HERE) {
            let location = self.env.location_of(&actor)?;
            return Ok(if self.env.obj_valid(&location)? {
                MatchResult::Found(location)
            } else {
                MatchResult::NotFound
            });
        }

        match match_surroundings(&self.env, &actor, object_name)? {
            MatchResult::NotFound => Ok(match self.env.find_player(object_name)? {
                Some(player) => MatchResult::Found(player),
                None => MatchResult::NotFound,
            }),
            result => Ok(result),
        }
    }
}
