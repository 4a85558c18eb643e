//! Assignment synchronization between labels and the schedule document.
//!
//! - **Export** turns labels into assignment records on the round-1 group
//!   activities, numbering competitor stations per room.
//! - **Import** rebuilds labels from existing assignment records, then
//!   derives each event's stage count from the restored group numbers.
//! - **CSV import** reads labels from an organizer sheet
//!   (`name,<event ids…>`, one label per cell).
//!
//! Only first-round activities are synchronized. Later rounds are
//! assigned from results.

use std::collections::{BTreeMap, HashMap};

use crate::config::GeneralConfiguration;
use crate::error::{GroupingError, Result};
use crate::label::{Label, Task};
use crate::models::{ActivityCode, Assignment, AssignmentCode, Event, Schedule};
use crate::roster::Roster;
use crate::staff::csv_reader;

/// Writes assignment records for every round-1 group activity.
///
/// Existing records are discarded first. Competitors are seated in roster
/// order from the room's first station; their station and room color are
/// recorded on the roster. Scramblers, judges and runners get no station.
/// Returns the number of records written.
///
/// # Errors
/// [`GroupingError::Format`] if a group activity has a malformed code. The
/// roster is untouched in that case.
pub fn export_assignments(roster: &mut Roster, schedule: &Schedule, configuration: &GeneralConfiguration) -> Result<usize> {
    let mut groups = Vec::new();
    for room in schedule.rooms() {
        for activity in room.activities.iter().filter(|a| !a.is_other()) {
            for child in &activity.child_activities {
                let code = child.code()?;
                if let (1, Some(group)) = (code.round_number, code.group_number) {
                    groups.push((room, child.id, code.event_id, group));
                }
            }
        }
    }

    roster.reset_assignments();
    let mut written = 0;
    for (room, activity_id, event_id, group) in groups {
        let first_station = configuration.station_number_from(room.id);
        let competitors: Vec<usize> = (0..roster.len())
            .filter(|&i| roster.get(i).is_some_and(|c| c.label(&event_id).group() == Some(group)))
            .collect();
        for (offset, &index) in competitors.iter().enumerate() {
            let station = first_station + offset as i64;
            roster.push_assignment(index, Assignment::competitor(activity_id, station));
            roster.set_station(index, &event_id, station, &room.color);
            written += 1;
        }

        for task in [Task::Judge, Task::Scrambler, Task::Runner] {
            let staff: Vec<usize> = (0..roster.len())
                .filter(|&i| roster.get(i).is_some_and(|c| c.label(&event_id).has_task(task, group)))
                .collect();
            for index in staff {
                roster.push_assignment(index, Assignment::staff(activity_id, task));
                written += 1;
            }
        }
    }

    tracing::info!(written, "exported assignments");
    Ok(written)
}

/// Rebuilds every label from the persons' assignment records.
///
/// Records are applied in assignment-code order so the competing group
/// comes first. Records for unknown activities, later rounds or attempts
/// other than the first are ignored. Stage counts are recomputed afterwards.
///
/// # Errors
/// [`GroupingError::Format`] if an activity code in the schedule is
/// malformed. Nothing is changed in that case.
pub fn import_assignments(roster: &mut Roster, schedule: &Schedule, events: &mut [Event]) -> Result<()> {
    let codes: HashMap<i64, ActivityCode> = schedule
        .all_activities()
        .into_iter()
        .filter(|a| !a.is_other())
        .map(|a| a.code().map(|code| (a.id, code)))
        .collect::<Result<_>>()?;

    roster.reset_labels();
    for index in 0..roster.len() {
        roster.sort_assignments(index);
        let Some(competitor) = roster.get(index) else {
            continue;
        };

        let mut labels: BTreeMap<String, Label> = BTreeMap::new();
        let mut stations: Vec<(String, Option<i64>)> = Vec::new();
        for assignment in &competitor.person().assignments {
            let Some(code) = codes.get(&assignment.activity_id).filter(|c| c.is_first_round()) else {
                continue;
            };
            let group = code.group_number.unwrap_or(1);
            let label = labels.entry(code.event_id.clone()).or_default();
            match (&assignment.assignment_code, assignment.assignment_code.task()) {
                (AssignmentCode::Competitor, _) => {
                    label.set_group(group);
                    stations.push((code.event_id.clone(), assignment.station_number));
                }
                (_, Some(task)) => label.push_task(task, group),
                (other, None) => tracing::debug!(code = %other, "ignoring unknown assignment code"),
            }
        }

        for (event_id, label) in labels {
            roster.assign_label(index, &event_id, label);
        }
        for (event_id, station) in stations {
            roster.set_station_number(index, &event_id, station);
        }
    }

    recompute_stages(roster, events);
    tracing::info!(persons = roster.len(), "imported assignments");
    Ok(())
}

/// Replaces labels with those of an organizer CSV sheet.
///
/// The header row is `name` followed by event ids. Each data line names a
/// person by display or full name; unknown names are skipped. Returns the
/// number of persons imported. Stage counts are recomputed afterwards.
///
/// # Errors
/// [`GroupingError::Format`] if no delimiter can be detected, the text is
/// not valid CSV or a cell is not a valid label. Nothing is changed in that
/// case.
pub fn import_groups_from_csv(roster: &mut Roster, events: &mut [Event], text: &str) -> Result<usize> {
    let mut reader = csv_reader(text)?;
    let headers = reader.headers()?.clone();

    let mut imports = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 2 {
            continue;
        }
        let name = record.get(0).unwrap_or_default();
        let Some(index) = roster.position_by_name(name) else {
            tracing::debug!(name, "no person matches CSV line");
            continue;
        };
        let labels = headers
            .iter()
            .zip(record.iter())
            .skip(1)
            .map(|(event_id, cell)| cell.parse::<Label>().map(|label| (event_id, label)))
            .collect::<Result<Vec<_>>>()?;
        imports.push((index, labels));
    }

    let imported = imports.len();
    for (index, labels) in imports {
        for (event_id, label) in labels {
            roster.assign_label(index, event_id, label);
        }
    }
    recompute_stages(roster, events);
    tracing::info!(imported, "imported groups from CSV");
    Ok(imported)
}

/// Derives each event's stage count from the highest group in its labels.
///
/// `stages = highest / scrambleGroups`, at least 1. Events without
/// configuration are left alone.
pub fn recompute_stages(roster: &Roster, events: &mut [Event]) {
    for event in events.iter_mut() {
        let Some(configuration) = event.configuration.as_mut() else {
            continue;
        };
        let highest = roster
            .iter()
            .filter_map(|c| c.label(&event.id).highest_group())
            .max()
            .unwrap_or(0);
        configuration.stages = (highest / configuration.scramble_groups.max(1)).max(1);
    }
}
