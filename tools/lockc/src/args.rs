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

use clap_derive::{Parser, Subcommand};
use muse_db::DatabaseConfig;
use muse_kernel::KernelConfig;
use muse_var::Obj;
use std::path::PathBuf;

/// `#n` or a bare number.
pub fn parse_obj(s: &str) -> Result<Obj, String> {
    if s.starts_with('#') {
        return Obj::try_from(s).map_err(|e| e.to_string());
    }
    s.parse::<i32>()
        .map(Obj::mk_id)
        .map_err(|_| format!("not an object reference: {s:?}"))
}

#[derive(Parser, Debug)]
#[command(about = "Compile, decompile and evaluate locks against a world fixture")]
pub struct Args {
    #[arg(
        long,
        help = "World fixture to load, as YAML (or JSON, by file extension)"
    )]
    pub world: PathBuf,

    #[arg(
        long,
        help = "YAML config file with `database` and `kernel` sections. Flags below override it."
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub kernel_args: KernelArgs,

    #[arg(long, help = "Print results as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub struct KernelArgs {
    #[arg(long, help = "Longest lock text, in bytes, plus one")]
    pub buffer_len: Option<usize>,

    #[arg(long, help = "How many locks one evaluation may enter")]
    pub max_lock_depth: Option<usize>,

    #[arg(long, help = "Memoize attribute reads")]
    pub attr_cache: Option<bool>,

    #[arg(long, help = "How many attribute definitions one object may declare")]
    pub max_attr_defs: Option<usize>,
}

impl KernelArgs {
    pub fn merge_config(&self, config: &mut KernelConfig) -> Result<(), eyre::Report> {
        if let Some(args) = self.buffer_len {
            if args < 2 {
                return Err(eyre::eyre!("buffer length {args} is too small"));
            }
            config.buffer_len = args;
        }
        if let Some(args) = self.max_lock_depth {
            config.max_lock_depth = args;
        }
        Ok(())
    }

    pub fn merge_database_config(&self, config: &mut DatabaseConfig) -> Result<(), eyre::Report> {
        if let Some(args) = self.attr_cache {
            config.attr_cache = args;
        }
        if let Some(args) = self.max_attr_defs {
            config.max_attr_defs = args;
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Turn a lock as typed into its stored form.
    Compile {
        #[arg(long, value_parser = parse_obj, help = "Who is setting the lock")]
        actor: Obj,
        text: String,
    },
    /// Show a stored lock the way a player would see it.
    Decompile {
        #[arg(long, value_parser = parse_obj)]
        viewer: Obj,
        text: String,
    },
    /// Evaluate a stored lock.
    Eval {
        #[arg(long, value_parser = parse_obj)]
        actor: Obj,
        #[arg(long, value_parser = parse_obj, help = "The object the lock is on")]
        locked: Obj,
        #[arg(
            long,
            value_parser = parse_obj,
            help = "Zone in effect. Defaults to the actor's zone."
        )]
        zone: Option<Obj>,
        #[arg(help = "Lock text. Defaults to the locked object's Lock attribute.")]
        text: Option<String>,
    },
    /// Whether a player may use a thing, honouring the rules that override its lock.
    Check {
        #[arg(long, value_parser = parse_obj)]
        player: Obj,
        #[arg(long, value_parser = parse_obj)]
        thing: Obj,
        #[arg(long, default_value = "Lock", help = "Which lock attribute to check")]
        lock: String,
    },
}
