//! The phase queue scheduler.
//!
//! The queue decides which [`Phase`] runs next. It owns four collections:
//! - `primary`: FIFO of phases queued for this turn
//! - `prepend`: phases inserted ahead of `primary` on the next advance
//! - `deferred`: phases folded into `primary` only once it runs dry
//! - `conditional`: `(predicate, phase)` pairs re-tested on every advance
//!
//! and at most one `current` phase plus a one-deep `standby` slot for an
//! override that preempted it.
//!
//! # Architecture
//!
//! The prepend collection is a stack: the most recently unshifted phase runs
//! first. [`PhaseQueue::mark_insertion_point`] pins a splice index so a phase
//! can queue several follow-ups that run in the order it queued them, ahead
//! of whatever was unshifted before the mark.
//!
//! The engine runs the current phase by checking it out of the queue
//! ([`PhaseQueue::checkout`]), calling it with the context that owns the
//! queue, and checking it back in with its result
//! ([`PhaseQueue::checkin`]). An override requested while a phase is checked
//! out is held until the check-in.
//!
//! Misuse is reported through return values, never panics: a second
//! override returns `false`, a removal with no match returns `false`, and an
//! empty queue simply refills with the default turn-start phase.
//!
//! # Example
//!
//! ```
//! use skirmish_core::field::Field;
//! use skirmish_core::phases::MessagePhase;
//! use skirmish_core::queue::{Advance, PhaseQueue};
//!
//! let mut queue = PhaseQueue::new(|| Box::new(MessagePhase::new("A new turn!")));
//! let field = Field::new(1);
//!
//! queue.push(Box::new(MessagePhase::new("queued")), false);
//! queue.unshift(Box::new(MessagePhase::new("urgent")));
//!
//! assert_eq!(queue.advance(&field), Advance::Started);
//! assert_eq!(queue.current_len(), 1);
//! assert_eq!(queue.len(), 1);
//! ```

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use crate::field::Field;
use crate::phase::Phase;

/// Builds the phase that starts a new turn when the queue runs dry.
pub type TurnStartFactory = fn() -> Box<dyn Phase>;

/// Predicate gating a conditional phase.
pub type PhaseCondition = Box<dyn Fn(&Field) -> bool>;

/// What [`PhaseQueue::advance`] made current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A fresh phase that must be started.
    Started,
    /// A preempted phase restored from standby that must be resumed.
    Resumed,
}

/// What [`PhaseQueue::checkin`] did with the returned phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkin {
    /// The phase finished and was dropped.
    Retired,
    /// The phase is suspended and stays current.
    Current,
    /// A held override became current and must be started. The returned
    /// phase was dropped if it finished, or parked on standby if it was
    /// suspended.
    Overridden,
}

/// The phase scheduler.
pub struct PhaseQueue {
    primary: VecDeque<Box<dyn Phase>>,
    /// Last element runs first.
    prepend: Vec<Box<dyn Phase>>,
    deferred: VecDeque<Box<dyn Phase>>,
    conditional: VecDeque<(PhaseCondition, Box<dyn Phase>)>,
    insertion_point: Option<usize>,
    current: Option<Box<dyn Phase>>,
    checked_out: bool,
    standby: Option<Box<dyn Phase>>,
    held_override: Option<Box<dyn Phase>>,
    turn_start: TurnStartFactory,
}

impl fmt::Debug for PhaseQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseQueue")
            .field("current", &self.current)
            .field("standby", &self.standby)
            .field("prepend", &self.prepend)
            .field("primary", &self.primary)
            .field("deferred", &self.deferred)
            .field("conditional", &format!("[{} conditional]", self.conditional.len()))
            .field("insertion_point", &self.insertion_point)
            .finish_non_exhaustive()
    }
}

impl PhaseQueue {
    /// Creates an empty queue.
    ///
    /// # Arguments
    ///
    /// * `turn_start` - Builds the phase appended whenever the primary queue
    ///   runs dry
    #[must_use]
    pub fn new(turn_start: TurnStartFactory) -> Self {
        Self {
            primary: VecDeque::new(),
            prepend: Vec::new(),
            deferred: VecDeque::new(),
            conditional: VecDeque::new(),
            insertion_point: None,
            current: None,
            checked_out: false,
            standby: None,
            held_override: None,
            turn_start,
        }
    }

    // =========================================================================
    // Queueing
    // =========================================================================

    /// Appends a phase to the primary queue, or to the deferred queue.
    pub fn push(&mut self, phase: Box<dyn Phase>, deferred: bool) {
        if deferred {
            self.deferred.push_back(phase);
        } else {
            self.primary.push_back(phase);
        }
    }

    /// Queues a phase to run before everything already in the primary queue.
    ///
    /// Without an insertion point the phase runs before every earlier
    /// unshifted phase. With one, it is spliced at the pinned index, so
    /// phases unshifted after the mark run in the order they were unshifted,
    /// ahead of those unshifted before it.
    pub fn unshift(&mut self, phase: Box<dyn Phase>) {
        match self.insertion_point {
            Some(index) if index <= self.prepend.len() => self.prepend.insert(index, phase),
            _ => self.prepend.push(phase),
        }
    }

    /// Pins the splice index used by [`PhaseQueue::unshift`] at the current position.
    pub fn mark_insertion_point(&mut self) {
        self.insertion_point = Some(self.prepend.len());
    }

    /// Drops the pinned splice index.
    pub fn clear_insertion_point(&mut self) {
        self.insertion_point = None;
    }

    /// Queues a phase that becomes eligible once `condition` holds.
    ///
    /// The head of the conditional list is tested once per advance; an unmet
    /// condition sends its entry to the back of the list.
    pub fn push_conditional(&mut self, phase: Box<dyn Phase>, condition: PhaseCondition) {
        self.conditional.push_back((condition, phase));
    }

    // =========================================================================
    // Advancing
    // =========================================================================

    /// Makes the next phase current.
    ///
    /// 1. A phase on standby is restored first.
    /// 2. Prepended phases move to the front of the primary queue.
    /// 3. An empty primary queue takes the deferred phases, then a new
    ///    turn-start phase.
    /// 4. The front phase becomes current and the head of the conditional
    ///    list is tested once.
    ///
    /// The caller must start or resume the current phase as indicated.
    pub fn advance(&mut self, field: &Field) -> Advance {
        self.current = None;
        if let Some(phase) = self.standby.take() {
            trace!(phase = ?phase, "restoring standby phase");
            self.current = Some(phase);
            return Advance::Resumed;
        }

        for phase in self.prepend.drain(..) {
            self.primary.push_front(phase);
        }
        self.insertion_point = None;

        if self.primary.is_empty() {
            self.primary.extend(self.deferred.drain(..));
            self.primary.push_back((self.turn_start)());
        }
        self.current = self.primary.pop_front();

        if let Some((condition, phase)) = self.conditional.pop_front() {
            if condition(field) {
                trace!(phase = ?phase, "conditional phase released");
                self.primary.push_back(phase);
            } else {
                self.conditional.push_back((condition, phase));
            }
        }
        Advance::Started
    }

    /// Preempts the current phase with `phase`.
    ///
    /// Returns `false`, changing nothing, if an override is already in
    /// effect. While the current phase is checked out, the override is held
    /// until [`PhaseQueue::checkin`]; otherwise the current phase moves to
    /// standby and `phase` becomes current immediately, and the caller must
    /// start it.
    pub fn override_phase(&mut self, phase: Box<dyn Phase>) -> bool {
        if self.standby.is_some() || self.held_override.is_some() {
            debug!(phase = ?phase, "override rejected: already overridden");
            return false;
        }
        if self.checked_out {
            self.held_override = Some(phase);
            return true;
        }
        self.standby = self.current.take();
        self.current = Some(phase);
        true
    }

    /// Removes the current phase so it can be run against the context.
    pub fn checkout(&mut self) -> Option<Box<dyn Phase>> {
        let phase = self.current.take()?;
        self.checked_out = true;
        Some(phase)
    }

    /// Returns a checked-out phase with whether it finished.
    pub fn checkin(&mut self, phase: Box<dyn Phase>, finished: bool) -> Checkin {
        self.checked_out = false;
        if let Some(held) = self.held_override.take() {
            if !finished {
                self.standby = Some(phase);
            }
            self.current = Some(held);
            return Checkin::Overridden;
        }
        if finished {
            trace!(phase = ?phase, "phase retired");
            return Checkin::Retired;
        }
        self.current = Some(phase);
        Checkin::Current
    }

    // =========================================================================
    // Targeted mutation
    // =========================================================================

    /// Returns `true` if a queued or prepended phase matches.
    pub fn find(&self, predicate: impl Fn(&dyn Phase) -> bool) -> bool {
        self.prepend.iter().any(|p| predicate(p.as_ref()))
            || self.primary.iter().any(|p| predicate(p.as_ref()))
    }

    /// Replaces the first matching primary phase. Returns `false` if none matched.
    pub fn try_replace(
        &mut self,
        predicate: impl Fn(&dyn Phase) -> bool,
        phase: Box<dyn Phase>,
    ) -> bool {
        match self.primary.iter().position(|p| predicate(p.as_ref())) {
            Some(index) => {
                self.primary[index] = phase;
                true
            }
            None => false,
        }
    }

    /// Removes the first matching primary phase. Returns `false` if none matched.
    pub fn try_remove(&mut self, predicate: impl Fn(&dyn Phase) -> bool) -> bool {
        match self.primary.iter().position(|p| predicate(p.as_ref())) {
            Some(index) => self.primary.remove(index).is_some(),
            None => false,
        }
    }

    /// Removes every matching primary phase. Returns how many were removed.
    pub fn remove_all(&mut self, predicate: impl Fn(&dyn Phase) -> bool) -> usize {
        let before = self.primary.len();
        self.primary.retain(|p| !predicate(p.as_ref()));
        before - self.primary.len()
    }

    /// Removes the matching prepended phase that would run first. Returns
    /// `false` if none matched.
    pub fn try_remove_unshifted(&mut self, predicate: impl Fn(&dyn Phase) -> bool) -> bool {
        let Some(index) = self.prepend.iter().rposition(|p| predicate(p.as_ref())) else {
            return false;
        };
        self.prepend.remove(index);
        if let Some(point) = self.insertion_point.as_mut() {
            if index < *point {
                *point -= 1;
            }
        }
        true
    }

    /// Inserts `phase` before the first matching primary phase, or unshifts it.
    pub fn prepend_before(&mut self, phase: Box<dyn Phase>, predicate: impl Fn(&dyn Phase) -> bool) {
        match self.primary.iter().position(|p| predicate(p.as_ref())) {
            Some(index) => self.primary.insert(index, phase),
            None => self.unshift(phase),
        }
    }

    /// Inserts `phase` after the first matching primary phase, or unshifts it.
    pub fn append_after(&mut self, phase: Box<dyn Phase>, predicate: impl Fn(&dyn Phase) -> bool) {
        match self.primary.iter().position(|p| predicate(p.as_ref())) {
            Some(index) => self.primary.insert(index + 1, phase),
            None => self.unshift(phase),
        }
    }

    /// Drops every queued phase, including standby, held override and conditionals.
    ///
    /// A checked-out phase is unaffected until it is checked in.
    pub fn clear(&mut self) {
        self.primary.clear();
        self.prepend.clear();
        self.deferred.clear();
        self.conditional.clear();
        self.insertion_point = None;
        self.standby = None;
        self.held_override = None;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns the current phase, if one is current and not checked out.
    #[must_use]
    pub fn current(&self) -> Option<&dyn Phase> {
        self.current.as_deref()
    }

    /// Returns 1 if a phase is current (including checked out), else 0.
    #[must_use]
    pub fn current_len(&self) -> usize {
        usize::from(self.current.is_some() || self.checked_out)
    }

    /// Returns `true` if a preempted phase waits on standby.
    #[must_use]
    pub fn has_standby(&self) -> bool {
        self.standby.is_some()
    }

    /// Returns the number of phases in the primary queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primary.len()
    }

    /// Returns `true` if nothing at all is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
            && self.prepend.is_empty()
            && self.deferred.is_empty()
            && self.conditional.is_empty()
    }

    /// Returns the number of prepended phases.
    #[must_use]
    pub fn prepended_len(&self) -> usize {
        self.prepend.len()
    }

    /// Returns the number of deferred phases.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Returns the number of conditional phases still waiting.
    #[must_use]
    pub fn conditional_len(&self) -> usize {
        self.conditional.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineContext;
    use crate::phase::{PhaseKind, PhaseStatus};

    /// A phase that only carries a label.
    struct Label(&'static str);

    impl Phase for Label {
        fn kind(&self) -> PhaseKind {
            PhaseKind::External(self.0)
        }

        fn start(&mut self, _ctx: &mut EngineContext) -> PhaseStatus {
            PhaseStatus::Done
        }
    }

    fn label(name: &'static str) -> Box<dyn Phase> {
        Box::new(Label(name))
    }

    fn queue() -> PhaseQueue {
        PhaseQueue::new(|| label("turn"))
    }

    fn name_of(phase: &dyn Phase) -> &'static str {
        match phase.kind() {
            PhaseKind::External(name) => name,
            _ => "?",
        }
    }

    /// Advances `n` times, retiring each phase, and returns the labels run.
    fn run(queue: &mut PhaseQueue, field: &Field, n: usize) -> Vec<&'static str> {
        (0..n)
            .map(|_| {
                queue.advance(field);
                let phase = queue.checkout().unwrap();
                let name = name_of(phase.as_ref());
                queue.checkin(phase, true);
                name
            })
            .collect()
    }

    mod ordering_tests {
        use super::*;

        #[test]
        fn primary_queue_is_fifo() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("a"), false);
            q.push(label("b"), false);
            q.push(label("c"), false);
            assert_eq!(run(&mut q, &field, 3), vec!["a", "b", "c"]);
        }

        #[test]
        fn prepended_phases_run_most_recent_first() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("queued"), false);
            q.unshift(label("first"));
            q.unshift(label("second"));
            assert_eq!(run(&mut q, &field, 3), vec!["second", "first", "queued"]);
        }

        #[test]
        fn insertion_point_keeps_follow_ups_in_order() {
            let field = Field::new(1);
            let mut q = queue();
            q.unshift(label("a"));
            q.mark_insertion_point();
            q.unshift(label("b"));
            q.unshift(label("c"));
            assert_eq!(run(&mut q, &field, 3), vec!["b", "c", "a"]);
        }

        #[test]
        fn advance_clears_insertion_point() {
            let field = Field::new(1);
            let mut q = queue();
            q.mark_insertion_point();
            q.unshift(label("x"));
            run(&mut q, &field, 1);
            q.unshift(label("y"));
            q.unshift(label("z"));
            assert_eq!(run(&mut q, &field, 2), vec!["z", "y"]);
        }

        #[test]
        fn empty_queue_takes_deferred_then_turn_start() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("now"), false);
            q.push(label("later1"), true);
            q.push(label("later2"), true);
            assert_eq!(
                run(&mut q, &field, 4),
                vec!["now", "later1", "later2", "turn"]
            );
            assert_eq!(q.deferred_len(), 0);
        }
    }

    mod conditional_tests {
        use super::*;

        #[test]
        fn unmet_conditions_rotate_to_the_back() {
            let field = Field::new(1);
            let mut q = queue();
            q.push_conditional(label("never"), Box::new(|_: &Field| false));
            q.push_conditional(label("always"), Box::new(|_: &Field| true));
            q.push(label("a"), false);
            q.push(label("b"), false);

            // First advance tests "never"; second tests "always" and releases it.
            assert_eq!(run(&mut q, &field, 3), vec!["a", "b", "always"]);
            assert_eq!(q.conditional_len(), 1);
        }

        #[test]
        fn conditions_see_the_field() {
            let mut field = Field::new(1);
            let mut q = queue();
            q.push_conditional(
                label("rainy"),
                Box::new(|f: &Field| f.weather_kind().is_some()),
            );
            assert_eq!(run(&mut q, &field, 1), vec!["turn"]);
            field.set_weather(crate::field::Weather::new(crate::field::WeatherKind::Rain));
            assert_eq!(run(&mut q, &field, 2), vec!["turn", "rainy"]);
        }
    }

    mod override_tests {
        use super::*;

        #[test]
        fn override_parks_current_and_restores_it() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("main"), false);
            q.push(label("next"), false);
            assert_eq!(q.advance(&field), Advance::Started);

            assert!(q.override_phase(label("urgent")));
            assert!(q.has_standby());
            assert_eq!(name_of(q.current().unwrap()), "urgent");

            let urgent = q.checkout().unwrap();
            assert_eq!(q.checkin(urgent, true), Checkin::Retired);
            assert_eq!(q.advance(&field), Advance::Resumed);
            assert_eq!(name_of(q.current().unwrap()), "main");
        }

        #[test]
        fn second_override_is_rejected() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("main"), false);
            q.advance(&field);
            assert!(q.override_phase(label("one")));
            assert!(!q.override_phase(label("two")));
            assert_eq!(name_of(q.current().unwrap()), "one");
            assert!(q.has_standby());
        }

        #[test]
        fn override_during_checkout_is_held_until_checkin() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("main"), false);
            q.advance(&field);
            let main = q.checkout().unwrap();
            assert!(q.override_phase(label("urgent")));
            assert!(!q.override_phase(label("again")));

            // A suspended phase is parked; the held override becomes current.
            assert_eq!(q.checkin(main, false), Checkin::Overridden);
            assert!(q.has_standby());
            assert_eq!(name_of(q.current().unwrap()), "urgent");
        }

        #[test]
        fn finished_phase_is_dropped_when_override_takes_over() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("main"), false);
            q.advance(&field);
            let main = q.checkout().unwrap();
            assert!(q.override_phase(label("urgent")));
            assert_eq!(q.checkin(main, true), Checkin::Overridden);
            assert!(!q.has_standby());
        }
    }

    mod mutation_tests {
        use super::*;

        fn named(name: &'static str) -> impl Fn(&dyn Phase) -> bool {
            move |p: &dyn Phase| name_of(p) == name
        }

        #[test]
        fn find_sees_primary_and_prepended() {
            let mut q = queue();
            q.push(label("a"), false);
            q.unshift(label("b"));
            assert!(q.find(named("a")));
            assert!(q.find(named("b")));
            assert!(!q.find(named("c")));
        }

        #[test]
        fn replace_and_remove_report_misses() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("a"), false);
            q.push(label("b"), false);
            assert!(q.try_replace(named("a"), label("z")));
            assert!(!q.try_replace(named("missing"), label("y")));
            assert!(q.try_remove(named("b")));
            assert!(!q.try_remove(named("b")));
            assert_eq!(run(&mut q, &field, 1), vec!["z"]);
        }

        #[test]
        fn remove_unshifted_adjusts_insertion_point() {
            let field = Field::new(1);
            let mut q = queue();
            q.unshift(label("a"));
            q.mark_insertion_point();
            assert!(q.try_remove_unshifted(named("a")));
            q.unshift(label("b"));
            q.unshift(label("c"));
            assert_eq!(run(&mut q, &field, 2), vec!["b", "c"]);
        }

        #[test]
        fn prepend_before_and_append_after_fall_back_to_unshift() {
            let field = Field::new(1);
            let mut q = queue();
            q.push(label("a"), false);
            q.push(label("b"), false);
            q.prepend_before(label("before_b"), named("b"));
            q.append_after(label("after_a"), named("a"));
            q.append_after(label("orphan"), named("missing"));
            assert_eq!(
                run(&mut q, &field, 5),
                vec!["orphan", "a", "after_a", "before_b", "b"]
            );
        }

        #[test]
        fn clear_empties_everything() {
            let mut q = queue();
            q.push(label("a"), false);
            q.push(label("b"), true);
            q.unshift(label("c"));
            q.push_conditional(label("d"), Box::new(|_: &Field| true));
            q.clear();
            assert!(q.is_empty());
        }
    }
}
