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

//! Deciding whether a lock lets someone through.

use crate::config::KernelConfig;
use crate::env::{FunctionEvaluator, Notifier, PassthroughEvaluator};
use crate::expand::expand;
use muse_common::matching::{DefaultObjectNameMatcher, MatchResult, ObjectNameMatcher};
use muse_common::model::{AttrFlag, WorldStateError};
use muse_common::util::wild_match;
use muse_compiler::{CompileError, CompiledLock, LockExpr, RefKind, compile, decompile, parse_lock};
use muse_db::{AttrDef, AttrVisibility, Builtin, World, builtin_def};
use muse_var::{NOTHING, Obj};
use thiserror::Error;
use tracing::{debug, error, trace, warn};

static PASSTHROUGH: PassthroughEvaluator = PassthroughEvaluator;

/// Why a lock could not be set or compiled.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum LockError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    World(#[from] WorldStateError),
    #[error("You can't set that attribute.")]
    PermissionDenied,
    #[error("{0} is not a lock.")]
    NotALock(String),
}

/// Who is being tested, and where, for one top-level evaluation. Indirect locks share it, so the
/// depth counts every lock entered since the evaluation began.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct EvalContext {
    actor: Obj,
    /// The object whose lock is being evaluated right now. Names are matched relative to it.
    locked: Obj,
    /// The object whose lock the evaluation started from. Its owner hears about runaway locks.
    origin: Obj,
    zone: Obj,
    depth: usize,
}

impl EvalContext {
    fn new(actor: Obj, locked: Obj, zone: Obj) -> Self {
        Self {
            actor,
            locked,
            origin: locked,
            zone,
            depth: 0,
        }
    }
}

/// Evaluates, compiles and decompiles locks against a world.
///
/// The world supplies name matching and attribute visibility unless others are given. Function
/// calls are left unevaluated unless a [`FunctionEvaluator`] is supplied.
pub struct LockEvaluator<'a> {
    world: &'a World,
    matcher: Box<dyn ObjectNameMatcher + 'a>,
    visibility: &'a dyn AttrVisibility,
    functions: &'a dyn FunctionEvaluator,
    notifier: &'a dyn Notifier,
    config: KernelConfig,
}

impl<'a> LockEvaluator<'a> {
    pub fn new(world: &'a World, notifier: &'a dyn Notifier) -> Self {
        Self {
            world,
            matcher: Box::new(DefaultObjectNameMatcher::new(world)),
            visibility: world,
            functions: &PASSTHROUGH,
            notifier,
            config: KernelConfig::default(),
        }
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: Box<dyn ObjectNameMatcher + 'a>) -> Self {
        self.matcher = matcher;
        self
    }

    #[must_use]
    pub fn with_visibility(mut self, visibility: &'a dyn AttrVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    #[must_use]
    pub fn with_functions(mut self, functions: &'a dyn FunctionEvaluator) -> Self {
        self.functions = functions;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: KernelConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn world(&self) -> &'a World {
        self.world
    }

    #[must_use]
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Whether `actor` passes `text`, the compiled lock on `locked`, with `zone` as the zone in
    /// effect.
    #[must_use]
    pub fn evaluate(&self, actor: Obj, locked: Obj, text: &str, zone: Obj) -> bool {
        if !self.world.valid(locked) {
            error!(?actor, ?locked, "lock evaluated on invalid object");
            return false;
        }
        if text.is_empty() {
            return true;
        }
        if text.len() >= self.config.buffer_len {
            let owner = self.world.owner_of(locked);
            if self.world.valid(owner) {
                self.notifier.notify(
                    owner,
                    &format!(
                        "Warning: lock too long on {}",
                        self.world.unparse_object(owner, locked)
                    ),
                );
            }
            warn!(?locked, len = text.len(), "lock too long");
            return false;
        }

        let mut ctx = EvalContext::new(actor, locked, zone);
        let result = self.eval_lock(&mut ctx, text);
        debug!(?actor, ?locked, ?zone, text, result, "lock evaluated");
        result
    }

    /// Whether `actor` passes the lock stored in `attr` on `locked`.
    #[must_use]
    pub fn evaluate_attr(&self, actor: Obj, locked: Obj, attr: &AttrDef, zone: Obj) -> bool {
        let text = self.world.get_attr(locked, attr);
        self.evaluate(actor, locked, &text, zone)
    }

    fn eval_lock(&self, ctx: &mut EvalContext, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        ctx.depth += 1;
        if ctx.depth > self.config.max_lock_depth {
            if let Some(owner) = self.origin_owner(ctx) {
                self.notifier.notify(
                    owner,
                    &format!(
                        "Warning: recursion detected in {} lock.",
                        self.world.unparse_object(owner, ctx.locked)
                    ),
                );
            }
            warn!(origin = ?ctx.origin, locked = ?ctx.locked, depth = ctx.depth, "lock recursion");
            return false;
        }

        let expanded = expand(
            self.functions,
            text,
            ctx.actor,
            ctx.locked,
            self.config.buffer_len,
        );
        let expr = parse_lock(&expanded);
        trace!(locked = ?ctx.locked, %expr, "lock parsed");
        self.eval_expr(ctx, &expr)
    }

    fn eval_expr(&self, ctx: &mut EvalContext, expr: &LockExpr) -> bool {
        match expr {
            // Every term is evaluated, so warnings from any of them are always raised.
            LockExpr::Or(terms) => terms
                .iter()
                .fold(false, |passed, term| self.eval_expr(ctx, term) | passed),
            LockExpr::And(terms) => terms
                .iter()
                .fold(true, |passed, term| self.eval_expr(ctx, term) & passed),
            LockExpr::Not(inner) => !self.eval_expr(ctx, inner),
            LockExpr::TooDeep => {
                self.warn_origin_owner(ctx, "Warning: lock nested too deeply on");
                warn!(origin = ?ctx.origin, locked = ?ctx.locked, "lock nested too deeply");
                false
            }
            LockExpr::Number(n) => *n != 0,
            LockExpr::AttrTest { name, pattern } => {
                self.test_attr(ctx, ctx.actor, name, pattern, false)
            }
            LockExpr::Ref { kind, name } => {
                let Some(thing) = self.resolve(ctx, name) else {
                    return false;
                };
                match kind {
                    RefKind::Is => ctx.actor == thing,
                    RefKind::Carry => self.carries(ctx.actor, thing),
                    RefKind::Any => {
                        self.world.valid(ctx.actor)
                            && (ctx.actor == thing
                                || self.carries(ctx.actor, thing)
                                || ctx.zone == thing)
                    }
                }
            }
            LockExpr::Indirect(name) => {
                let Some(thing) = self.resolve(ctx, name) else {
                    return false;
                };
                if !self
                    .visibility
                    .can_see(ctx.locked, thing, &Builtin::Lock.def())
                {
                    return false;
                }
                self.eval_indirect(ctx, thing)
            }
            LockExpr::IndirectLock(name) => {
                let Some(thing) = self.resolve(ctx, name) else {
                    return false;
                };
                self.eval_indirect(ctx, thing)
            }
            LockExpr::IndirectAttr { target, test } => {
                let Some(thing) = self.resolve(ctx, target) else {
                    return false;
                };
                let Some((name, pattern)) = test else {
                    return false;
                };
                self.test_attr(ctx, thing, name, pattern, true)
            }
        }
    }

    /// The owner of the object the evaluation started from, who hears about broken locks.
    fn origin_owner(&self, ctx: &EvalContext) -> Option<Obj> {
        let owner = self.world.owner_of(ctx.origin);
        self.world.valid(owner).then_some(owner)
    }

    fn warn_origin_owner(&self, ctx: &EvalContext, message: &str) {
        if let Some(owner) = self.origin_owner(ctx) {
            self.notifier.notify(
                owner,
                &format!("{message} {}.", self.world.unparse_object(owner, ctx.locked)),
            );
        }
    }

    /// Evaluate `thing`'s own lock in place of the current one.
    fn eval_indirect(&self, ctx: &mut EvalContext, thing: Obj) -> bool {
        let text = self.world.get_attr(thing, &Builtin::Lock.def());
        let outer = std::mem::replace(&mut ctx.locked, thing);
        let result = self.eval_lock(ctx, &text);
        ctx.locked = outer;
        result
    }

    /// The object `name` refers to, seen from the lock being evaluated.
    fn resolve(&self, ctx: &EvalContext, name: &str) -> Option<Obj> {
        match self.matcher.match_object(ctx.locked, name) {
            Ok(MatchResult::Found(obj)) if self.world.valid(obj) => Some(obj),
            Ok(MatchResult::Ambiguous(candidates)) => {
                trace!(name, ?candidates, "ambiguous name in lock");
                None
            }
            Ok(_) => None,
            Err(e) => {
                error!(name, error = ?e, "name match failed during lock evaluation");
                None
            }
        }
    }

    fn carries(&self, holder: Obj, thing: Obj) -> bool {
        self.world
            .record(holder)
            .is_ok_and(|r| r.contents().contains(&thing))
    }

    /// The definition `name` means when testing `subject`'s attributes.
    fn lookup_attr(&self, subject: Obj, name: &str) -> Option<AttrDef> {
        if name.contains('.') {
            return self
                .world
                .resolve_attr_with(self.matcher.as_ref(), subject, NOTHING, name);
        }
        builtin_def(name).or_else(|| self.world.find_def(subject, name))
    }

    /// `subject`'s value for `name` against `pattern`. With `gated`, the lock being evaluated
    /// must also be allowed to see the attribute.
    fn test_attr(
        &self,
        ctx: &EvalContext,
        subject: Obj,
        name: &str,
        pattern: &str,
        gated: bool,
    ) -> bool {
        if !self.world.valid(subject) {
            return false;
        }
        let Some(def) = self.lookup_attr(subject, name) else {
            trace!(?subject, name, "unknown attribute in lock");
            return false;
        };
        if def.has_flag(AttrFlag::Dark) {
            return false;
        }
        if gated && !self.visibility.can_see(ctx.locked, subject, &def) {
            return false;
        }
        wild_match(pattern, &self.world.get_attr(subject, &def))
    }

    /// Compile `text` for `actor`. Warnings and failures are passed on to the actor.
    pub fn compile_lock(&self, actor: Obj, text: &str) -> Result<CompiledLock, LockError> {
        match compile(
            self.world,
            self.matcher.as_ref(),
            actor,
            text,
            self.config.buffer_len,
        ) {
            Ok(compiled) => {
                for warning in &compiled.warnings {
                    self.notifier.notify(actor, warning);
                }
                Ok(compiled)
            }
            Err(e) => {
                if self.world.valid(actor) {
                    self.notifier.notify(actor, &e.to_string());
                }
                Err(e.into())
            }
        }
    }

    /// A compiled lock as `viewer` should see it.
    #[must_use]
    pub fn decompile_lock(&self, viewer: Obj, text: &str) -> String {
        decompile(
            self.world,
            self.matcher.as_ref(),
            viewer,
            text,
            self.config.buffer_len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{FunctionOutput, RecordingNotifier};
    use muse_common::model::ObjType;
    use muse_common::util::BitEnum;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    struct Setup {
        world: World,
        room: Obj,
        alice: Obj,
        bob: Obj,
        box_: Obj,
    }

    fn setup() -> Setup {
        let mut world = World::default();
        let room = world
            .create_object("Hall", ObjType::Room, NOTHING, NOTHING)
            .unwrap();
        let alice = world
            .create_object("Alice", ObjType::Player, NOTHING, room)
            .unwrap();
        let bob = world
            .create_object("Bob", ObjType::Player, NOTHING, room)
            .unwrap();
        let box_ = world
            .create_object("box", ObjType::Thing, alice, room)
            .unwrap();
        world
            .set_attr(alice, &Builtin::Sex.def(), "female")
            .unwrap();
        Setup {
            world,
            room,
            alice,
            bob,
            box_,
        }
    }

    #[test_case("1", true; "one")]
    #[test_case("0", false; "zero")]
    #[test_case("12", true; "any nonzero")]
    #[test_case("1&0", false; "and")]
    #[test_case("1|0", true; "or")]
    #[test_case("0&0|1", true; "or binds loosest")]
    #[test_case("!0", true; "not")]
    #[test_case("!!0", false; "double not")]
    #[test_case("!(1|0)", false; "not group")]
    #[test_case("(0|1)&(1|0)", true; "groups")]
    #[test_case("1)|0", true; "stray close paren")]
    #[test_case("0x|1", false; "junk ends the expression")]
    fn test_constants(text: &str, expected: bool) {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        assert_eq!(evaluator.evaluate(s.alice, s.box_, text, NOTHING), expected);
    }

    #[test]
    fn test_references() {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        let alice = s.alice.to_literal();
        assert!(evaluator.evaluate(s.alice, s.box_, &alice, NOTHING));
        assert!(evaluator.evaluate(s.alice, s.box_, &format!("={alice}"), NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, &alice, NOTHING));
        assert!(!evaluator.evaluate(s.alice, s.box_, "#999", NOTHING));

        // The zone only counts for bare references.
        let room = s.room.to_literal();
        assert!(evaluator.evaluate(s.bob, s.box_, &room, s.room));
        assert!(!evaluator.evaluate(s.bob, s.box_, &format!("={room}"), s.room));
    }

    #[test]
    fn test_carrying() {
        let mut s = setup();
        let lock = format!("+{}", s.box_);
        {
            let notifier = RecordingNotifier::new();
            let evaluator = LockEvaluator::new(&s.world, &notifier);
            assert!(!evaluator.evaluate(s.alice, s.room, &lock, NOTHING));
        }
        s.world.move_to(s.box_, s.alice).unwrap();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        assert!(evaluator.evaluate(s.alice, s.room, &lock, NOTHING));
        assert!(evaluator.evaluate(s.alice, s.room, &s.box_.to_literal(), NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.room, &lock, NOTHING));
    }

    #[test]
    fn test_attribute_tests() {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        assert!(evaluator.evaluate(s.alice, s.box_, "sex:f*", NOTHING));
        assert!(evaluator.evaluate(s.alice, s.box_, "SEX:FEMALE", NOTHING));
        assert!(!evaluator.evaluate(s.alice, s.box_, "sex:m*", NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, "sex:f*", NOTHING));
        assert!(evaluator.evaluate(s.alice, s.box_, "name:ali*&sex:?emale", NOTHING));
        // Unknown attributes never match, and the rest of the lock still counts.
        assert!(!evaluator.evaluate(s.alice, s.box_, "frobozz:*", NOTHING));
        assert!(evaluator.evaluate(s.alice, s.box_, "frobozz:*|1", NOTHING));
    }

    #[test]
    fn test_dark_attributes_never_match() {
        let mut s = setup();
        s.world
            .set_attr(s.alice, &Builtin::Password.def(), "secret")
            .unwrap();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        assert!(!evaluator.evaluate(s.alice, s.box_, "password:*", NOTHING));
    }

    #[test]
    fn test_user_attributes() {
        let mut s = setup();
        let def = s
            .world
            .define_attr(s.alice, "MOOD", BitEnum::new())
            .unwrap()
            .def()
            .clone();
        s.world.set_attr(s.alice, &def, "happy").unwrap();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        assert!(evaluator.evaluate(s.alice, s.box_, "mood:hap*", NOTHING));
        let dotted = format!("{}.mood:happy", s.alice);
        assert!(evaluator.evaluate(s.alice, s.box_, &dotted, NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, &dotted, NOTHING));
    }

    #[test]
    fn test_indirect_locks() {
        let mut s = setup();
        let gate = s
            .world
            .create_object("gate", ObjType::Thing, s.alice, s.room)
            .unwrap();
        s.world
            .set_attr(gate, &Builtin::Lock.def(), &s.alice.to_literal())
            .unwrap();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        let lock = format!("@{gate}");
        assert!(evaluator.evaluate(s.alice, s.box_, &lock, NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, &lock, NOTHING));
        assert!(evaluator.evaluate(s.alice, s.box_, &format!("@({gate})"), NOTHING));
        assert!(!evaluator.evaluate(s.alice, s.box_, "@#999", NOTHING));
    }

    #[test]
    fn test_indirect_lock_visibility() {
        let mut s = setup();
        // Owned by Bob, so the box (Alice's) may not read its lock.
        let gate = s
            .world
            .create_object("gate", ObjType::Thing, s.bob, s.room)
            .unwrap();
        s.world.set_attr(gate, &Builtin::Lock.def(), "1").unwrap();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        assert!(!evaluator.evaluate(s.alice, s.box_, &format!("@{gate}"), NOTHING));
        assert!(evaluator.evaluate(s.alice, s.box_, &format!("@({gate})"), NOTHING));
    }

    #[test]
    fn test_indirect_attribute_tests() {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        let alice = s.alice;
        assert!(evaluator.evaluate(s.bob, s.box_, &format!("@({alice}=sex:f*)"), NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, &format!("@({alice}=sex:m*)"), NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, &format!("@({alice}=sex)"), NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, "@(#999=sex:*)", NOTHING));
    }

    #[test]
    fn test_self_reference_is_bounded() {
        let mut s = setup();
        let lock = format!("@{}", s.box_);
        s.world
            .set_attr(s.box_, &Builtin::Lock.def(), &lock)
            .unwrap();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        assert!(!evaluator.evaluate(s.alice, s.box_, &lock, NOTHING));
        let warnings = notifier.messages_for(s.alice);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Warning: recursion detected in box"));
    }

    #[test]
    fn test_depth_is_configurable() {
        let mut s = setup();
        let gate = s
            .world
            .create_object("gate", ObjType::Thing, s.alice, s.room)
            .unwrap();
        s.world.set_attr(gate, &Builtin::Lock.def(), "1").unwrap();
        let notifier = RecordingNotifier::new();
        let lock = format!("@{gate}");
        let shallow = LockEvaluator::new(&s.world, &notifier).with_config(KernelConfig {
            max_lock_depth: 1,
            ..KernelConfig::default()
        });
        assert!(!shallow.evaluate(s.alice, s.box_, &lock, NOTHING));
        let deeper = LockEvaluator::new(&s.world, &notifier).with_config(KernelConfig {
            max_lock_depth: 2,
            ..KernelConfig::default()
        });
        assert!(deeper.evaluate(s.alice, s.box_, &lock, NOTHING));
    }

    #[test]
    fn test_preconditions() {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier).with_config(KernelConfig {
            buffer_len: 16,
            ..KernelConfig::default()
        });
        assert!(evaluator.evaluate(s.bob, s.box_, "", NOTHING));
        assert!(!evaluator.evaluate(s.bob, Obj::mk_id(999), "", NOTHING));
        assert!(!evaluator.evaluate(s.bob, s.box_, &"1|".repeat(10), NOTHING));
        let warnings = notifier.messages_for(s.alice);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Warning: lock too long on box"));
    }

    struct Answer(&'static str);

    impl FunctionEvaluator for Answer {
        fn evaluate(&self, text: &str, _actor: Obj, _privs: Obj) -> FunctionOutput {
            FunctionOutput {
                output: self.0.to_string(),
                consumed: text.find(']').unwrap_or(text.len()),
            }
        }
    }

    #[test]
    fn test_functions_are_expanded_before_parsing() {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let yes = Answer("1");
        let no = Answer("0");
        let evaluator = LockEvaluator::new(&s.world, &notifier).with_functions(&yes);
        assert!(evaluator.evaluate(s.bob, s.box_, "[anything]", NOTHING));
        let evaluator = LockEvaluator::new(&s.world, &notifier).with_functions(&no);
        assert!(!evaluator.evaluate(s.bob, s.box_, "[anything]", NOTHING));
    }

    #[test]
    fn test_compile_lock_notifies() {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);

        let compiled = evaluator.compile_lock(s.alice, "me|frobozz:1").unwrap();
        assert_eq!(compiled.text, format!("{}|frobozz:1", s.alice));
        assert_eq!(
            notifier.messages_for(s.alice),
            vec!["Warning: no such built in attribute 'frobozz'".to_string()]
        );

        notifier.clear();
        assert_eq!(
            evaluator.compile_lock(s.alice, "no_such_player_xyz"),
            Err(LockError::Compile(CompileError::NoMatch(
                "no_such_player_xyz".to_string()
            )))
        );
        assert_eq!(
            notifier.messages_for(s.alice),
            vec!["I don't see \"no_such_player_xyz\" here.".to_string()]
        );
    }

    #[test]
    fn test_decompile_lock() {
        let s = setup();
        let notifier = RecordingNotifier::new();
        let evaluator = LockEvaluator::new(&s.world, &notifier);
        let text = format!("{}&!{}", s.bob, s.box_);
        assert_eq!(evaluator.decompile_lock(s.alice, &text), "Bob&!box");
    }
}
