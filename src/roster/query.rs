//! Read-only roster queries used by the grouping engine.

use crate::label::Task;

use super::Roster;

/// Sorting, filtering and counting over the roster.
///
/// All methods work on roster indices and never mutate. "History" means
/// labels in events other than the one being grouped.
pub trait RosterQuery {
    /// Stable-sorts `candidates` by how often each already holds `task`
    /// in other events, least loaded first.
    fn sort_by_task_load(&self, task: Task, event_id: &str, candidates: &mut [usize]);

    /// Stable-sorts `candidates` by the ratio of duties to competing events,
    /// least loaded first.
    fn sort_by_task_ratio(&self, candidates: &mut [usize]);

    /// The `limit` fastest competitors of an event by personal best, fastest first.
    fn top_competitors_by_speed(&self, event_id: &str, limit: usize) -> Vec<usize>;

    /// Persons whose label competes in `group`.
    fn count_competitors(&self, event_id: &str, group: u32) -> usize;

    /// Persons whose label holds `task` for `group`.
    fn count_assigned_task(&self, task: Task, event_id: &str, group: u32) -> usize;

    fn is_organizer_or_delegate(&self, index: usize) -> bool;
}

impl Roster {
    fn task_history(&self, index: usize, task: Task, except_event: &str) -> usize {
        self.competitors[index]
            .events()
            .filter(|(id, _)| *id != except_event)
            .map(|(_, state)| state.label().count_task(task))
            .sum()
    }

    fn task_ratio(&self, index: usize) -> f64 {
        let competitor = &self.competitors[index];
        let competing = competitor.events().filter(|(_, s)| s.competing()).count();
        let tasks: usize = competitor
            .events()
            .map(|(_, s)| s.label().tasks().len())
            .sum();
        tasks as f64 / competing.max(1) as f64
    }
}

impl RosterQuery for Roster {
    fn sort_by_task_load(&self, task: Task, event_id: &str, candidates: &mut [usize]) {
        candidates.sort_by_key(|&i| self.task_history(i, task, event_id));
    }

    fn sort_by_task_ratio(&self, candidates: &mut [usize]) {
        candidates.sort_by(|&a, &b| self.task_ratio(a).total_cmp(&self.task_ratio(b)));
    }

    fn top_competitors_by_speed(&self, event_id: &str, limit: usize) -> Vec<usize> {
        let mut ranked: Vec<(i64, usize)> = self
            .competing_indices(event_id)
            .into_iter()
            .filter_map(|i| {
                self.competitors[i]
                    .person()
                    .personal_best(event_id)
                    .map(|best| (best, i))
            })
            .collect();
        ranked.sort();
        ranked.into_iter().take(limit).map(|(_, i)| i).collect()
    }

    fn count_competitors(&self, event_id: &str, group: u32) -> usize {
        self.iter()
            .filter(|c| c.is_competing(event_id) && c.label(event_id).group() == Some(group))
            .count()
    }

    fn count_assigned_task(&self, task: Task, event_id: &str, group: u32) -> usize {
        self.iter()
            .filter(|c| c.label(event_id).has_task(task, group))
            .count()
    }

    fn is_organizer_or_delegate(&self, index: usize) -> bool {
        self.competitors[index].person().is_organizer_or_delegate()
    }
}
