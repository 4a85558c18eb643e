//! Group label codec.
//!
//! A label is the compact per-person, per-event string that records the
//! person's competing group and any staffing duties:
//!
//! ```text
//! label := "" | groupNumber (";" taskLetter groupNumber)*
//! ```
//!
//! `"2;S3"` reads "competes in group 2, scrambles group 3". An empty label
//! means the person does not compete in the event. Group numbers are
//! positive and written without leading zeros. Tokens are kept in the
//! order they were assigned, so `format(parse(s)) == s`.
//!
//! Persons who only staff an event (restored from assignment records) carry
//! a label without a bare group, e.g. `"J3"`.
//!
//! # Example
//!
//! ```
//! use u_grouping::label::{Label, Task};
//!
//! let label: Label = "2;S3".parse().unwrap();
//! assert_eq!(label.group(), Some(2));
//! assert!(label.has_task(Task::Scrambler, 3));
//! assert_eq!(label.to_string(), "2;S3");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::GroupingError;

const SEPARATOR: char = ';';

/// A staffing duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    Scrambler,
    Runner,
    Judge,
    DataEntry,
    Announcer,
}

impl Task {
    pub const ALL: [Task; 5] = [
        Task::Scrambler,
        Task::Runner,
        Task::Judge,
        Task::DataEntry,
        Task::Announcer,
    ];

    /// Single-letter token used in labels.
    pub fn letter(self) -> char {
        match self {
            Task::Scrambler => 'S',
            Task::Runner => 'R',
            Task::Judge => 'J',
            Task::DataEntry => 'D',
            Task::Announcer => 'A',
        }
    }

    pub fn from_letter(letter: char) -> Option<Task> {
        Task::ALL.into_iter().find(|t| t.letter() == letter)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Parsed group label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Label {
    group: Option<u32>,
    tasks: Vec<(Task, u32)>,
}

impl Label {
    /// The empty label (not competing, no duties).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A label competing in `group` with no duties.
    pub fn competing(group: u32) -> Self {
        Self {
            group: Some(group),
            tasks: Vec::new(),
        }
    }

    /// Appends a duty.
    pub fn with_task(mut self, task: Task, group: u32) -> Self {
        self.push_task(task, group);
        self
    }

    /// Competing group (1-based), if any.
    pub fn group(&self) -> Option<u32> {
        self.group
    }

    /// Duties in assignment order.
    pub fn tasks(&self) -> &[(Task, u32)] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_none() && self.tasks.is_empty()
    }

    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Whether the label holds `task` for `group`.
    pub fn has_task(&self, task: Task, group: u32) -> bool {
        self.tasks.contains(&(task, group))
    }

    /// Number of duties of one kind.
    pub fn count_task(&self, task: Task) -> usize {
        self.tasks.iter().filter(|(t, _)| *t == task).count()
    }

    /// Whether the person is busy in `group`, competing or staffing.
    pub fn is_involved_in(&self, group: u32) -> bool {
        self.group == Some(group) || self.tasks.iter().any(|&(_, g)| g == group)
    }

    /// Sets the competing group.
    pub fn set_group(&mut self, group: u32) {
        self.group = Some(group);
    }

    /// Appends a duty.
    pub fn push_task(&mut self, task: Task, group: u32) {
        self.tasks.push((task, group));
    }

    /// Highest group number referenced by any token.
    pub fn highest_group(&self) -> Option<u32> {
        self.group
            .into_iter()
            .chain(self.tasks.iter().map(|&(_, g)| g))
            .max()
    }

    /// Whether both labels carry the same kinds of duties, ignoring groups.
    pub fn similar_tasks(&self, other: &Label) -> bool {
        let mut mine: Vec<Task> = self.tasks.iter().map(|&(t, _)| t).collect();
        let mut theirs: Vec<Task> = other.tasks.iter().map(|&(t, _)| t).collect();
        mine.sort();
        theirs.sort();
        mine == theirs
    }

    /// Whether the competing slot comes strictly before every duty.
    ///
    /// Groups are numbered stage-major, so the time slot of group `g` is
    /// `(g - 1) / stages`. Labels without duties always compete first.
    pub fn competes_before_staffing(&self, stages: u32) -> bool {
        let Some(group) = self.group else {
            return false;
        };
        let slot = |g: u32| (g.saturating_sub(1)) / stages.max(1);
        self.tasks.iter().all(|&(_, g)| slot(group) < slot(g))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(group) = self.group {
            write!(f, "{group}")?;
            first = false;
        }
        for (task, group) in &self.tasks {
            if !first {
                write!(f, "{SEPARATOR}")?;
            }
            write!(f, "{task}{group}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Label {
    type Err = GroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut label = Label::empty();
        if s.is_empty() {
            return Ok(label);
        }

        for (index, token) in s.split(SEPARATOR).enumerate() {
            let invalid = |reason: &str| {
                GroupingError::Format(format!("invalid label '{s}': token '{token}' {reason}"))
            };
            let mut chars = token.chars();
            let first = chars.next().ok_or_else(|| invalid("is empty"))?;

            if first.is_ascii_digit() {
                if index != 0 {
                    return Err(invalid("is a competing group after a duty"));
                }
                label.group = Some(parse_group(token).ok_or_else(|| invalid("is not a group number"))?);
            } else {
                let task = Task::from_letter(first).ok_or_else(|| invalid("has an unknown task letter"))?;
                let group = parse_group(chars.as_str()).ok_or_else(|| invalid("has no group number"))?;
                label.tasks.push((task, group));
            }
        }
        Ok(label)
    }
}

fn parse_group(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_empty() {
        let label: Label = "".parse().unwrap();
        assert!(label.is_empty());
        assert_eq!(label.to_string(), "");
    }

    #[test]
    fn test_parse_competing_only() {
        let label: Label = "3".parse().unwrap();
        assert_eq!(label, Label::competing(3));
        assert!(!label.has_tasks());
    }

    #[test]
    fn test_parse_with_tasks() {
        let label: Label = "1;S2;J4".parse().unwrap();
        assert_eq!(label.group(), Some(1));
        assert_eq!(label.tasks(), &[(Task::Scrambler, 2), (Task::Judge, 4)]);
        assert_eq!(label.highest_group(), Some(4));
    }

    #[test]
    fn test_staff_only_label() {
        let label: Label = "J3".parse().unwrap();
        assert_eq!(label.group(), None);
        assert!(label.has_task(Task::Judge, 3));
        assert_eq!(label.to_string(), "J3");
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        for bad in ["1;", ";1", "1;X2", "1;S", "1;S0", "0", "01", "1;J02", "1;2", "S1;2", "1;Sx", "1;S-1"] {
            assert!(
                matches!(bad.parse::<Label>(), Err(GroupingError::Format(_))),
                "accepted '{bad}'"
            );
        }
    }

    #[test]
    fn test_similar_tasks_ignores_groups_and_order() {
        let a = Label::competing(1).with_task(Task::Judge, 2).with_task(Task::Scrambler, 3);
        let b = Label::competing(4).with_task(Task::Scrambler, 1).with_task(Task::Judge, 1);
        let c = Label::competing(4).with_task(Task::Runner, 1);
        assert!(a.similar_tasks(&b));
        assert!(!a.similar_tasks(&c));
        assert!(Label::competing(1).similar_tasks(&Label::competing(2)));
    }

    #[test]
    fn test_competes_before_staffing() {
        // One stage: group 1 then group 2.
        assert!(Label::competing(1).with_task(Task::Judge, 2).competes_before_staffing(1));
        assert!(!Label::competing(2).with_task(Task::Judge, 1).competes_before_staffing(1));
        // Two stages: groups 1 and 2 share the first time slot.
        assert!(!Label::competing(1).with_task(Task::Judge, 2).competes_before_staffing(2));
        assert!(Label::competing(2).with_task(Task::Judge, 3).competes_before_staffing(2));
        assert!(Label::competing(3).competes_before_staffing(2));
        assert!(!Label::empty().competes_before_staffing(1));
    }

    #[test]
    fn test_is_involved_in() {
        let label = Label::competing(1).with_task(Task::Runner, 3);
        assert!(label.is_involved_in(1));
        assert!(label.is_involved_in(3));
        assert!(!label.is_involved_in(2));
    }

    fn arb_label() -> impl Strategy<Value = Label> {
        (
            proptest::option::of(1u32..50),
            proptest::collection::vec((0usize..Task::ALL.len(), 1u32..50), 0..5),
        )
            .prop_map(|(group, tasks)| Label {
                group,
                tasks: tasks.into_iter().map(|(t, g)| (Task::ALL[t], g)).collect(),
            })
    }

    proptest! {
        #[test]
        fn prop_format_then_parse_is_identity(label in arb_label()) {
            let text = label.to_string();
            prop_assert_eq!(text.parse::<Label>().unwrap(), label);
        }
    }
}
