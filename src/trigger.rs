// src/trigger.rs
//! Trigger data model and evaluation.
//!
//! Triggers are stored in a [`TriggerArena`] and addressed by [`TriggerId`].
//! Combinators hold the ids of their children, so a sub-trigger referenced by
//! several combinators is stored once. A combinator is only accepted when
//! every child id already names a slot of the same arena, so children always
//! sit below their parents and every tree is finite and acyclic.
//!
//! Ids are scoped to the arena that issued them. An id past the end of an
//! arena is rejected with [`ForeignTriggerId`]. Evaluation and rendering walk
//! the arena without recursion, so nesting depth is bounded only by memory.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::fmt::Write as _;

use crate::error::{ForeignTriggerId, TimestampError};
use crate::phrase::{self, Phrase};
use crate::story::NewsItem;

/// Fixed textual format of time-trigger cutoffs (UTC).
pub const CUTOFF_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a cutoff such as `2016-10-12T23:59:59Z`.
pub fn parse_cutoff(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    NaiveDateTime::parse_from_str(raw, CUTOFF_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| TimestampError {
            value: raw.to_string(),
        })
}

/// Index of a node inside its [`TriggerArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(usize);

impl TriggerId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A boolean predicate over a [`NewsItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Title(Phrase),
    Description(Phrase),
    /// Strictly earlier than the cutoff.
    Before(DateTime<Utc>),
    /// Strictly later than the cutoff.
    After(DateTime<Utc>),
    Not(TriggerId),
    And(TriggerId, TriggerId),
    Or(TriggerId, TriggerId),
}

impl Trigger {
    /// Configuration keyword for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Trigger::Title(_) => "TITLE",
            Trigger::Description(_) => "DESCRIPTION",
            Trigger::Before(_) => "BEFORE",
            Trigger::After(_) => "AFTER",
            Trigger::Not(_) => "NOT",
            Trigger::And(..) => "AND",
            Trigger::Or(..) => "OR",
        }
    }
}

/// Pending output while rendering a tree.
enum Step<'a> {
    Node(TriggerId),
    Text(&'a str),
}

/// Append-only storage of trigger nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerArena {
    nodes: Vec<Trigger>,
}

impl TriggerArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node behind `id`, or `None` for an id this arena never issued.
    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.nodes.get(id.0)
    }

    fn check(&self, id: TriggerId) -> Result<TriggerId, ForeignTriggerId> {
        if id.0 < self.nodes.len() {
            Ok(id)
        } else {
            Err(ForeignTriggerId {
                index: id.0,
                len: self.nodes.len(),
            })
        }
    }

    /// Push a node whose children, if any, are already checked.
    fn append(&mut self, trigger: Trigger) -> TriggerId {
        self.nodes.push(trigger);
        TriggerId(self.nodes.len() - 1)
    }

    pub fn title(&mut self, phrase: &str) -> TriggerId {
        self.append(Trigger::Title(Phrase::new(phrase)))
    }

    pub fn description(&mut self, phrase: &str) -> TriggerId {
        self.append(Trigger::Description(Phrase::new(phrase)))
    }

    pub fn before(&mut self, cutoff: DateTime<Utc>) -> TriggerId {
        self.append(Trigger::Before(cutoff))
    }

    pub fn after(&mut self, cutoff: DateTime<Utc>) -> TriggerId {
        self.append(Trigger::After(cutoff))
    }

    pub fn not(&mut self, inner: TriggerId) -> Result<TriggerId, ForeignTriggerId> {
        let inner = self.check(inner)?;
        Ok(self.append(Trigger::Not(inner)))
    }

    pub fn and(&mut self, left: TriggerId, right: TriggerId) -> Result<TriggerId, ForeignTriggerId> {
        let (left, right) = (self.check(left)?, self.check(right)?);
        Ok(self.append(Trigger::And(left, right)))
    }

    pub fn or(&mut self, left: TriggerId, right: TriggerId) -> Result<TriggerId, ForeignTriggerId> {
        let (left, right) = (self.check(left)?, self.check(right)?);
        Ok(self.append(Trigger::Or(left, right)))
    }

    /// `Or(Title(keyword), Description(keyword))`.
    pub fn keyword(&mut self, keyword: &str) -> TriggerId {
        let title = self.title(keyword);
        let description = self.description(keyword);
        self.append(Trigger::Or(title, description))
    }

    /// Truth value of every node in `..upto` for `item`, bottom-up.
    fn values(&self, upto: usize, item: &NewsItem) -> Vec<bool> {
        let title = phrase::words(&item.title);
        let description = phrase::words(&item.description);
        let mut values: Vec<bool> = Vec::with_capacity(upto);
        for node in &self.nodes[..upto] {
            // Children sit below their parent, so their values are known.
            let value = match node {
                Trigger::Title(p) => p.is_in_words(&title),
                Trigger::Description(p) => p.is_in_words(&description),
                Trigger::Before(cutoff) => item.published_at < *cutoff,
                Trigger::After(cutoff) => item.published_at > *cutoff,
                Trigger::Not(inner) => !values[inner.0],
                Trigger::And(l, r) => values[l.0] && values[r.0],
                Trigger::Or(l, r) => values[l.0] || values[r.0],
            };
            values.push(value);
        }
        values
    }

    /// Evaluate the trigger rooted at `id` against `item`. Total and pure:
    /// an id outside this arena evaluates to `false`.
    pub fn evaluate(&self, id: TriggerId, item: &NewsItem) -> bool {
        if id.0 >= self.nodes.len() {
            return false;
        }
        self.values(id.0 + 1, item)[id.0]
    }

    /// Render the tree rooted at `id`, e.g. `OR(TITLE("storm"), DESCRIPTION("storm"))`.
    /// An id outside this arena renders as `UNKNOWN(#n)`.
    pub fn describe(&self, id: TriggerId) -> String {
        let mut out = String::new();
        let mut pending = vec![Step::Node(id)];
        while let Some(step) = pending.pop() {
            let id = match step {
                Step::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Step::Node(id) => id,
            };
            let Some(node) = self.get(id) else {
                let _ = write!(out, "UNKNOWN(#{})", id.0);
                continue;
            };
            match node {
                Trigger::Title(p) | Trigger::Description(p) => {
                    let _ = write!(out, "{}({:?})", node.kind(), p.as_str());
                }
                Trigger::Before(t) | Trigger::After(t) => {
                    let _ = write!(out, "{}({})", node.kind(), t.format(CUTOFF_FORMAT));
                }
                Trigger::Not(inner) => {
                    out.push_str("NOT(");
                    pending.extend([Step::Text(")"), Step::Node(*inner)]);
                }
                Trigger::And(l, r) | Trigger::Or(l, r) => {
                    out.push_str(node.kind());
                    out.push('(');
                    pending.extend([
                        Step::Text(")"),
                        Step::Node(*r),
                        Step::Text(", "),
                        Step::Node(*l),
                    ]);
                }
            }
        }
        out
    }

    /// Move every node of `other` into `self`; returns the id offset applied.
    fn absorb(&mut self, other: TriggerArena) -> usize {
        let offset = self.nodes.len();
        let shift = |id: TriggerId| TriggerId(id.0 + offset);
        self.nodes.extend(other.nodes.into_iter().map(|node| match node {
            Trigger::Not(a) => Trigger::Not(shift(a)),
            Trigger::And(a, b) => Trigger::And(shift(a), shift(b)),
            Trigger::Or(a, b) => Trigger::Or(shift(a), shift(b)),
            leaf => leaf,
        }));
        offset
    }
}

/// Ordered triggers applied during filtering, together with their arena.
///
/// Duplicates are allowed. An empty list matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationList {
    arena: TriggerArena,
    active: Vec<TriggerId>,
}

impl ActivationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(arena: TriggerArena, active: Vec<TriggerId>) -> Self {
        Self { arena, active }
    }

    /// One `Or(Title(kw), Description(kw))` per keyword, in order.
    pub fn from_keywords<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut list = Self::new();
        for kw in keywords {
            let id = list.arena.keyword(kw.as_ref());
            list.active.push(id);
        }
        list
    }

    /// Arena used to build triggers for [`ActivationList::activate`].
    pub fn arena_mut(&mut self) -> &mut TriggerArena {
        &mut self.arena
    }

    pub fn arena(&self) -> &TriggerArena {
        &self.arena
    }

    /// Append `id`, which must come from this list's own arena.
    pub fn activate(&mut self, id: TriggerId) -> Result<(), ForeignTriggerId> {
        let id = self.arena.check(id)?;
        self.active.push(id);
        Ok(())
    }

    pub fn ids(&self) -> &[TriggerId] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Activated root triggers in activation order.
    pub fn iter(&self) -> impl Iterator<Item = &Trigger> + '_ {
        self.active.iter().filter_map(move |id| self.arena.get(*id))
    }

    /// Position of the first activated trigger that fires for `item`.
    pub fn first_match(&self, item: &NewsItem) -> Option<usize> {
        if self.active.is_empty() {
            return None;
        }
        let values = self.arena.values(self.arena.len(), item);
        self.active.iter().position(|id| values[id.0])
    }

    pub fn matches(&self, item: &NewsItem) -> bool {
        self.first_match(item).is_some()
    }

    /// Expression strings of the activated triggers, in order.
    pub fn describe(&self) -> Vec<String> {
        self.active.iter().map(|id| self.arena.describe(*id)).collect()
    }

    /// Append `other`'s activations after this list's own.
    pub fn extend_from(&mut self, other: ActivationList) {
        let offset = self.arena.absorb(other.arena);
        self.active
            .extend(other.active.into_iter().map(|id| TriggerId(id.0 + offset)));
    }
}
