//! Round expansion into group activities.
//!
//! Splits every round-level activity into `scrambleGroups × stages` child
//! activities. Groups run one after another; the stages of a group run in
//! parallel and share its time slot.
//!
//! # Numbering
//!
//! Child group numbers are stage-major: `1 + stage + group × stages`. With
//! two stages, groups 1 and 2 run first (one per stage), then 3 and 4.
//! New children get identifiers above the highest identifier in the
//! schedule, in group-then-stage order.
//!
//! # Idempotence
//!
//! An activity that already has `scrambleGroups` or
//! `scrambleGroups × stages` children is left untouched, so expanding twice
//! is a no-op.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::config::EventConfiguration;
use crate::error::Result;
use crate::models::{Activity, Competition};

/// Creates child activities for every round that is not expanded yet.
///
/// Returns the number of child activities created.
///
/// # Errors
/// [`crate::GroupingError::Format`] if an event activity has a malformed code.
/// Every code is checked before the first child is created.
pub fn expand_rounds(competition: &mut Competition) -> Result<usize> {
    let configurations: HashMap<String, EventConfiguration> = competition
        .events
        .iter()
        .filter_map(|e| e.configuration.clone().map(|c| (e.id.clone(), c)))
        .collect();

    competition
        .schedule
        .rooms()
        .flat_map(|r| r.activities.iter())
        .filter(|a| !a.is_other())
        .try_for_each(|a| a.code().map(drop))?;

    let mut next_id = competition
        .schedule
        .highest_activity_id()
        .map_or(0, |id| id + 1);
    let mut created = 0;

    for room in competition.schedule.venues.iter_mut().flat_map(|v| v.rooms.iter_mut()) {
        for activity in room.activities.iter_mut().filter(|a| !a.is_other()) {
            let code = activity.code()?;
            let Some(configuration) = configurations.get(&code.event_id) else {
                tracing::debug!(activity = %activity.activity_code, "no configuration for event, not expanding");
                continue;
            };
            if has_expected_children(activity, configuration) {
                continue;
            }

            let children = create_children(activity, configuration, &mut next_id)?;
            created += children.len();
            activity.child_activities = children;
        }
    }

    if created > 0 {
        tracing::info!(created, "expanded rounds into group activities");
    }
    Ok(created)
}

fn has_expected_children(activity: &Activity, configuration: &EventConfiguration) -> bool {
    let count = activity.child_activities.len() as u32;
    count > 0 && (count == configuration.scramble_groups || count == configuration.number_of_groups())
}

fn create_children(
    activity: &Activity,
    configuration: &EventConfiguration,
    next_id: &mut i64,
) -> Result<Vec<Activity>> {
    let parent_code = activity.code()?;
    let stages = configuration.stages;
    let groups = configuration.scramble_groups;
    let times = split_in_groups(activity.start_time, activity.end_time, groups);

    let mut children = Vec::with_capacity(configuration.number_of_groups() as usize);
    for group_index in 0..groups {
        for stage_index in 0..stages {
            let mut code = parent_code.clone();
            code.group_number = Some(1 + stage_index + group_index * stages);

            let mut child = Activity::new(
                *next_id,
                code.to_string(),
                times[group_index as usize],
                times[group_index as usize + 1],
            );
            child.name = code.display_name();
            child.other = child_defaults();
            *next_id += 1;
            children.push(child);
        }
    }
    Ok(children)
}

fn child_defaults() -> Map<String, Value> {
    let mut other = Map::new();
    other.insert("scrambleSetId".into(), Value::Null);
    other.insert("extensions".into(), Value::Array(Vec::new()));
    other
}

/// Splits `[start, end]` into `groups` contiguous intervals of equal length.
///
/// Returns `groups + 1` boundaries; the first is `start` and the last is
/// `end`. Inner boundaries are interpolated in whole milliseconds.
pub fn split_in_groups(start: DateTime<Utc>, end: DateTime<Utc>, groups: u32) -> Vec<DateTime<Utc>> {
    let groups = groups.max(1);
    let total_ms = (end - start).num_milliseconds();

    let mut times = Vec::with_capacity(groups as usize + 1);
    times.push(start);
    for i in 1..groups {
        let offset = total_ms * i64::from(i) / i64::from(groups);
        times.push(start + Duration::milliseconds(offset));
    }
    times.push(end);
    times
}
