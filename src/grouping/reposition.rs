//! Top-competitor repositioning.
//!
//! For events where scrambling load depends on who is fastest, the fastest
//! competitors of a candidate list are moved to the tail positions of their
//! stage before round-robin assignment, which lands them in the last time
//! slots. Top competitor `i` goes to position
//!
//! ```text
//! (chunk + 1) × numberOfGroups − stageOffset − 1
//! chunk = i / stages, stageOffset = i mod stages
//! ```
//!
//! swapping with whoever holds that position. Nothing moves when there are
//! more top competitors in the list than fit in one group.
//!
//! TODO: confirm the intended fairness rule with the competition delegates;
//! the formula is kept as observed in production use.

use std::collections::HashSet;

use crate::config::EventConfiguration;
use crate::error::{GroupingError, Result};
use crate::roster::RosterQuery;

/// Events where the fastest competitors are moved towards the last groups.
const SCRAMBLE_DEPENDENT_EVENTS: [&str; 9] = [
    "222", "333", "333bf", "333oh", "clock", "pyram", "skewb", "sq1", "444bf",
];

pub fn is_scramble_dependent(event_id: &str) -> bool {
    SCRAMBLE_DEPENDENT_EVENTS.contains(&event_id)
}

/// Moves the `limit` fastest competitors of `candidates` to their tail positions.
///
/// # Errors
/// [`GroupingError::Consistency`] if `candidates` lists a person twice or the
/// configuration yields no group slots. `candidates` is untouched on error.
pub fn move_top_competitors<Q: RosterQuery>(
    roster: &Q,
    candidates: &mut [usize],
    event_id: &str,
    configuration: &EventConfiguration,
    limit: usize,
) -> Result<()> {
    if !is_scramble_dependent(event_id) || candidates.is_empty() {
        return Ok(());
    }

    let mut distinct = HashSet::with_capacity(candidates.len());
    if let Some(duplicate) = candidates.iter().find(|&&c| !distinct.insert(c)) {
        return Err(GroupingError::Consistency(format!(
            "person {duplicate} listed twice for {event_id}"
        )));
    }

    let top: Vec<usize> = roster
        .top_competitors_by_speed(event_id, limit)
        .into_iter()
        .filter(|i| distinct.contains(i))
        .collect();

    let share = candidates.len() as f64 / f64::from(configuration.scramble_groups.max(1));
    if top.len() as f64 > share {
        tracing::debug!(event_id, top = top.len(), candidates = candidates.len(), "not moving top competitors");
        return Ok(());
    }

    let targets = target_positions(top.len(), configuration)?;
    let last = candidates.len() - 1;
    for (&person, &target) in top.iter().zip(&targets) {
        let current = candidates
            .iter()
            .position(|&c| c == person)
            .ok_or_else(|| GroupingError::Consistency(format!("top competitor {person} vanished")))?;
        candidates.swap(current, target.min(last));
    }
    Ok(())
}

/// Raw tail positions for `count` top competitors, before clamping to the
/// candidate list.
pub fn target_positions(count: usize, configuration: &EventConfiguration) -> Result<Vec<usize>> {
    let stages = configuration.stages as usize;
    let number_of_groups = configuration.number_of_groups() as usize;
    if stages == 0 || number_of_groups == 0 {
        return Err(GroupingError::Consistency(format!(
            "{} stages × {} groups leaves no group slots",
            configuration.stages, configuration.scramble_groups
        )));
    }

    let mut seen = HashSet::with_capacity(count);
    let mut positions = Vec::with_capacity(count);
    for i in 0..count {
        let stage_offset = i % stages;
        let chunk = i / stages;
        let position = ((chunk + 1) * number_of_groups)
            .checked_sub(stage_offset + 1)
            .ok_or_else(|| GroupingError::Consistency(format!("negative target position for top competitor {i}")))?;
        if !seen.insert(position) {
            return Err(GroupingError::Consistency(format!(
                "duplicate target position {position}"
            )));
        }
        positions.push(position);
    }
    Ok(positions)
}
