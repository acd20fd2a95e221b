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

//! `lockc`: compile, decompile and evaluate locks against a world loaded from a fixture file.

mod args;
mod world_file;

use crate::args::{Args, Command};
use crate::world_file::{load_config, load_fixture, load_world};
use clap::Parser;
use eyre::eyre;
use muse_db::{AttrDef, Builtin, World, builtin_def};
use muse_kernel::{LockEvaluator, Notifier, could_doit, zone_of};
use muse_var::Obj;
use serde_derive::Serialize;
use tracing::{debug, info};

/// Messages meant for players go to stderr so stdout carries only results.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, player: Obj, message: &str) {
        eprintln!("[to {player}] {message}");
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Compiled { text: String, warnings: Vec<String> },
    Decompiled { text: String },
    Verdict { passed: bool },
}

impl Output {
    fn print(&self, json: bool) -> Result<(), eyre::Report> {
        if json {
            println!("{}", serde_json::to_string(self)?);
            return Ok(());
        }
        match self {
            Output::Compiled { text, .. } | Output::Decompiled { text } => println!("{text}"),
            Output::Verdict { passed } => println!("{}", if *passed { "pass" } else { "fail" }),
        }
        Ok(())
    }
}

fn find_lock(world: &World, thing: Obj, name: &str) -> Result<AttrDef, eyre::Report> {
    builtin_def(name)
        .or_else(|| world.find_def(thing, name))
        .ok_or_else(|| eyre!("No attribute {name:?} on {thing}"))
}

fn run(world: &World, evaluator: &LockEvaluator<'_>, command: Command) -> Result<Output, eyre::Report> {
    let output = match command {
        Command::Compile { actor, text } => {
            let compiled = evaluator
                .compile_lock(actor, &text)
                .map_err(|e| eyre!("{e}"))?;
            Output::Compiled {
                text: compiled.text,
                warnings: compiled.warnings,
            }
        }
        Command::Decompile { viewer, text } => Output::Decompiled {
            text: evaluator.decompile_lock(viewer, &text),
        },
        Command::Eval {
            actor,
            locked,
            zone,
            text,
        } => {
            let zone = zone.unwrap_or_else(|| zone_of(world, actor));
            let passed = match text {
                Some(text) => evaluator.evaluate(actor, locked, &text, zone),
                None => evaluator.evaluate_attr(actor, locked, &Builtin::Lock.def(), zone),
            };
            Output::Verdict { passed }
        }
        Command::Check {
            player,
            thing,
            lock,
        } => {
            let lock = find_lock(world, thing, &lock)?;
            Output::Verdict {
                passed: could_doit(evaluator, player, thing, &lock),
            }
        }
    };
    Ok(output)
}

fn main() -> Result<(), eyre::Report> {
    color_eyre::install()?;
    let args = Args::parse();

    muse_common::tracing::init_tracing(args.debug)?;

    let mut config = load_config(args.config_file.as_deref())?;
    args.kernel_args.merge_config(&mut config.kernel)?;

    let mut fixture = load_fixture(&args.world)?;
    if let Some(database) = config.database.take() {
        fixture.config = database;
    }
    args.kernel_args.merge_database_config(&mut fixture.config)?;
    debug!(?config, database = ?fixture.config, "configuration");

    let world = load_world(&fixture)?;
    info!(world = ?args.world, "loaded");

    let notifier = ConsoleNotifier;
    let evaluator = LockEvaluator::new(&world, &notifier).with_config(config.kernel);
    let output = run(&world, &evaluator, args.command)?;
    output.print(args.json)
}
