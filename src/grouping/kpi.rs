//! Grouping summary metrics.
//!
//! Counts, per group of an event, how many persons compete, judge, run and
//! scramble. Used to check capacity bounds after grouping and to decide
//! how many extra judges fixed seating needs.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Competitors | Labels whose bare group is `g` |
//! | Judges | Labels holding `J{g}` |
//! | Runners | Labels holding `R{g}` |
//! | Scramblers | Labels holding `S{g}` |

use crate::label::Task;
use crate::roster::{Roster, RosterQuery};

/// Counts for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCounts {
    /// Group number (1-based).
    pub group: u32,
    pub competitors: usize,
    pub judges: usize,
    pub runners: usize,
    pub scramblers: usize,
}

impl GroupCounts {
    pub fn task(&self, task: Task) -> usize {
        match task {
            Task::Judge => self.judges,
            Task::Runner => self.runners,
            Task::Scrambler => self.scramblers,
            Task::DataEntry | Task::Announcer => 0,
        }
    }
}

/// Per-group counts for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingKpi {
    pub event_id: String,
    /// One entry per group, in group order.
    pub groups: Vec<GroupCounts>,
}

impl GroupingKpi {
    /// Counts every group from 1 up to `number_of_groups`, or up to the
    /// highest group any label references if that is larger.
    pub fn calculate(roster: &Roster, event_id: &str, number_of_groups: u32) -> Self {
        let highest = roster
            .iter()
            .filter_map(|c| c.label(event_id).highest_group())
            .max()
            .unwrap_or(0)
            .max(number_of_groups);

        let groups = (1..=highest)
            .map(|group| GroupCounts {
                group,
                competitors: roster.count_competitors(event_id, group),
                judges: roster.count_assigned_task(Task::Judge, event_id, group),
                runners: roster.count_assigned_task(Task::Runner, event_id, group),
                scramblers: roster.count_assigned_task(Task::Scrambler, event_id, group),
            })
            .collect();

        Self {
            event_id: event_id.to_string(),
            groups,
        }
    }

    pub fn group(&self, group: u32) -> Option<&GroupCounts> {
        self.groups.iter().find(|g| g.group == group)
    }

    pub fn total_competitors(&self) -> usize {
        self.groups.iter().map(|g| g.competitors).sum()
    }

    /// Largest difference in competitor count between any two groups.
    pub fn competitor_spread(&self) -> usize {
        let counts = self.groups.iter().map(|g| g.competitors);
        counts.clone().max().unwrap_or(0) - counts.min().unwrap_or(0)
    }
}
