//! Fairness passes run after the advanced assignment.
//!
//! - **Fixed-seating backfill**: competitors stay at their station for the
//!   whole group, so every occupied station needs a judge. Groups with fewer
//!   judges than competitors are topped up with idle competitors of the same
//!   stage, least-loaded first.
//! - **Newcomer swap**: a newcomer should compete before staffing in their
//!   first event. Newcomers scheduled the other way round trade labels with
//!   an experienced competitor holding the same kinds of duties.

use crate::config::{EventConfiguration, GeneralConfiguration};
use crate::label::Task;
use crate::models::Event;
use crate::roster::{Roster, RosterQuery};

use super::can_judge;

/// Tops up judges until every group has as many judges as competitors.
///
/// Only applies to events with more than two groups per stage. Returns the
/// number of extra judges assigned.
pub fn fill_timers_with_judges(
    roster: &mut Roster,
    event_id: &str,
    configuration: &EventConfiguration,
    general: &GeneralConfiguration,
) -> usize {
    if configuration.scramble_groups <= 2 {
        return 0;
    }

    let stages = configuration.stages.max(1);
    let stage_of = |group: u32| (group - 1) % stages;
    let mut added = 0;

    for group in 1..=configuration.number_of_groups() {
        let competitors = roster.count_competitors(event_id, group);
        let judges = roster.count_assigned_task(Task::Judge, event_id, group);
        if judges >= competitors {
            continue;
        }

        let mut pool: Vec<usize> = roster
            .competing_indices(event_id)
            .into_iter()
            .filter(|&i| {
                let label = roster.get(i).map(|c| c.label(event_id)).unwrap_or_default();
                !label.has_tasks()
                    && label.group().is_some_and(|g| g != group && stage_of(g) == stage_of(group))
                    && can_judge(roster, i, general)
            })
            .collect();
        roster.sort_by_task_ratio(&mut pool);

        for &index in pool.iter().take(competitors - judges) {
            let mut label = roster.get(index).map(|c| c.label(event_id)).unwrap_or_default();
            label.push_task(Task::Judge, group);
            roster.assign_label(index, event_id, label);
            added += 1;
        }
    }

    if added > 0 {
        tracing::info!(event_id, added, "filled timers with extra judges");
    }
    added
}

/// Swaps newcomers who staff before competing in their first event.
///
/// `events` must be in start-time order. Returns the number of swaps made.
pub fn swap_newcomers_to_compete_first(
    roster: &mut Roster,
    events: &[Event],
    event_id: &str,
    configuration: &EventConfiguration,
) -> usize {
    let stages = configuration.stages;
    let mut swaps = 0;

    for index in 0..roster.len() {
        let Some(competitor) = roster.get(index) else {
            continue;
        };
        if !competitor.person().is_newcomer() || !competitor.is_competing(event_id) {
            continue;
        }
        let first_event = events.iter().find(|e| competitor.is_competing(&e.id));
        if first_event.map(|e| e.id.as_str()) != Some(event_id) {
            continue;
        }
        let label = competitor.label(event_id);
        if label.competes_before_staffing(stages) {
            continue;
        }

        let partner = roster.iter().position(|other| {
            !other.person().is_newcomer()
                && other.is_competing(event_id)
                && other.label(event_id).competes_before_staffing(stages)
                && label.similar_tasks(&other.label(event_id))
        });
        match partner {
            Some(partner) => {
                roster.swap_labels(index, partner, event_id);
                swaps += 1;
            }
            None => tracing::debug!(event_id, index, "no swap partner for newcomer"),
        }
    }
    swaps
}
