//! Advanced strategy: random groups with scramblers, runners and judges.
//!
//! Competitors are shuffled and then dealt round robin over the
//! `stages × scrambleGroups` group slots in three passes. Each pass only
//! sees persons the earlier passes left unassigned:
//!
//! 1. Scramblers, least scrambling history first.
//! 2. Runners, least running history first.
//! 3. Everyone else: judge while the slot has room and policy allows,
//!    otherwise compete only.
//!
//! A duty always targets the next time slot on the same stage, so a person
//! competing in slot `g` staffs group `((g + stages) mod N) + 1`.
//!
//! The three passes are planned first and written to the roster only when
//! all of them succeed. Backfill and the newcomer swap run afterwards.

use std::collections::BTreeMap;

use rand::Rng;

use crate::config::{EventConfiguration, GeneralConfiguration};
use crate::error::{GroupingError, Result};
use crate::label::{Label, Task};
use crate::models::Event;
use crate::roster::{Roster, RosterQuery};
use crate::staff::StaffRoster;

use super::counter::TaskCounter;
use super::fairness::{fill_timers_with_judges, swap_newcomers_to_compete_first};
use super::reposition::move_top_competitors;
use super::{can_judge, GroupingWarning};

/// Label group of a duty for a person competing in slot `group` (0-based).
pub fn next_group_on_same_stage(group: usize, stages: u32, number_of_groups: usize) -> u32 {
    ((group + stages as usize) % number_of_groups + 1) as u32
}

/// Groups one event with staffing duties.
///
/// `events` must be in start-time order; the newcomer swap uses it to find
/// each person's first event.
///
/// # Errors
/// [`GroupingError::Consistency`] if the configuration has no group slots or
/// repositioning fails. The roster is shuffled but no label is written.
pub fn assign_advanced<R: Rng>(
    roster: &mut Roster,
    events: &[Event],
    event_id: &str,
    configuration: &EventConfiguration,
    general: &GeneralConfiguration,
    staff: &StaffRoster,
    rng: &mut R,
) -> Result<Vec<GroupingWarning>> {
    let number_of_groups = configuration.number_of_groups() as usize;
    if number_of_groups == 0 {
        return Err(GroupingError::Consistency(format!("{event_id} has no group slots")));
    }

    roster.mark_staff(&staff.wca_ids());
    roster.shuffle(rng);

    let view: &Roster = roster;
    let competitors = view.competing_indices(event_id);
    let wca_id = |i: usize| view.get(i).and_then(|c| c.person().wca_id.as_deref());
    let scramblers: Vec<usize> = competitors
        .iter()
        .copied()
        .filter(|&i| staff.can_scramble(wca_id(i), event_id))
        .collect();
    let runners: Vec<usize> = competitors
        .iter()
        .copied()
        .filter(|&i| staff.can_run(wca_id(i)))
        .collect();

    let mut warnings = Vec::new();
    let needed = number_of_groups * configuration.scramblers as usize;
    if scramblers.len() < needed {
        warnings.push(GroupingWarning::ScramblerShortfall {
            event_id: event_id.to_string(),
            available: scramblers.len(),
            needed,
        });
    }
    let needed = number_of_groups * configuration.runners as usize;
    if runners.len() < needed {
        warnings.push(GroupingWarning::RunnerShortfall {
            event_id: event_id.to_string(),
            available: runners.len(),
            needed,
        });
    }
    for warning in &warnings {
        tracing::warn!(event_id, "{warning}");
    }

    let mut planner = Planner {
        roster: view,
        event_id,
        configuration,
        counter: TaskCounter::new(configuration),
        plan: BTreeMap::new(),
        top_limit: general.top_competitors,
    };
    planner.assign_task(Task::Scrambler, scramblers)?;
    planner.assign_task(Task::Runner, runners)?;
    let judging = !general.do_not_assign_judges;
    planner.assign_remaining(competitors, |i| judging && can_judge(view, i, general))?;
    let plan = planner.plan;

    for (index, label) in plan {
        roster.assign_label(index, event_id, label);
    }

    if general.fixed_seating && judging {
        fill_timers_with_judges(roster, event_id, configuration, general);
    }
    let swaps = swap_newcomers_to_compete_first(roster, events, event_id, configuration);
    tracing::info!(event_id, swaps, "assigned groups with staff");

    Ok(warnings)
}

/// Labels planned by the three passes, keyed by roster index.
struct Planner<'a> {
    roster: &'a Roster,
    event_id: &'a str,
    configuration: &'a EventConfiguration,
    counter: TaskCounter,
    plan: BTreeMap<usize, Label>,
    top_limit: usize,
}

impl Planner<'_> {
    fn number_of_groups(&self) -> usize {
        self.configuration.number_of_groups() as usize
    }

    fn unassigned(&self, candidates: Vec<usize>) -> Vec<usize> {
        candidates
            .into_iter()
            .filter(|i| !self.plan.contains_key(i))
            .collect()
    }

    fn label(&self, group: usize, task: Option<Task>) -> Label {
        let label = Label::competing(group as u32 + 1);
        match task {
            Some(task) => label.with_task(
                task,
                next_group_on_same_stage(group, self.configuration.stages, self.number_of_groups()),
            ),
            None => label,
        }
    }

    /// Deals `task` round robin; the slot advances after every candidate,
    /// whether or not they got the duty.
    fn assign_task(&mut self, task: Task, candidates: Vec<usize>) -> Result<()> {
        let mut candidates = self.unassigned(candidates);
        self.roster.sort_by_task_load(task, self.event_id, &mut candidates);
        move_top_competitors(self.roster, &mut candidates, self.event_id, self.configuration, self.top_limit)?;

        let mut group = 0;
        for index in candidates {
            if self.counter.take(group, task) {
                let label = self.label(group, Some(task));
                self.plan.insert(index, label);
            }
            group = (group + 1) % self.number_of_groups();
        }
        Ok(())
    }

    /// Places everyone left, judging where `may_judge` allows and the slot has room.
    fn assign_remaining(&mut self, competitors: Vec<usize>, may_judge: impl Fn(usize) -> bool) -> Result<()> {
        let mut competitors = self.unassigned(competitors);
        move_top_competitors(self.roster, &mut competitors, self.event_id, self.configuration, self.top_limit)?;

        let mut group = 0;
        for index in competitors {
            let task = (may_judge(index) && self.counter.take(group, Task::Judge)).then_some(Task::Judge);
            let label = self.label(group, task);
            self.plan.insert(index, label);
            group = (group + 1) % self.number_of_groups();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Person;
    use crate::staff::{StaffMember, RUN};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn persons(n: i64) -> Vec<Person> {
        (0..n)
            .map(|i| {
                Person::new(i, format!("P{i:02}"))
                    .with_wca_id(format!("2015PERS{i:02}"))
                    .with_events(&["333", "444"])
                    .with_single("333", 700 + i * 13)
            })
            .collect()
    }

    fn staff_for(persons: &[Person], scramble: usize, run: usize) -> StaffRoster {
        StaffRoster::new(
            persons
                .iter()
                .enumerate()
                .filter_map(|(i, p)| {
                    let mut member = StaffMember::new(p.name.clone(), p.wca_id.clone()?);
                    if i < scramble {
                        member = member.allow("333").allow("444");
                    }
                    if i >= scramble && i < scramble + run {
                        member = member.allow(RUN);
                    }
                    Some(member)
                })
                .collect(),
        )
    }

    fn events() -> Vec<Event> {
        vec![Event::new("333", 1), Event::new("444", 1)]
    }

    #[test]
    fn test_next_group_on_same_stage() {
        // One stage, three groups: 1 → 2, 2 → 3, 3 → 1.
        assert_eq!(next_group_on_same_stage(0, 1, 3), 2);
        assert_eq!(next_group_on_same_stage(2, 1, 3), 1);
        // Two stages, four slots: slot 0 (group 1) staffs group 3.
        assert_eq!(next_group_on_same_stage(0, 2, 4), 3);
        assert_eq!(next_group_on_same_stage(3, 2, 4), 2);
    }

    #[test]
    fn test_capacity_bounds_hold() {
        for seed in 0..10 {
            let persons = persons(40);
            let staff = staff_for(&persons, 10, 8);
            let mut roster = Roster::from_persons(persons, &["333", "444"]);
            let config = EventConfiguration::new(3, 2).with_staff(1, 1, 4);
            let general = GeneralConfiguration::default();

            let warnings = assign_advanced(
                &mut roster,
                &events(),
                "444",
                &config,
                &general,
                &staff,
                &mut SmallRng::seed_from_u64(seed),
            )
            .unwrap();
            assert!(warnings.is_empty());

            for group in 1..=6 {
                assert!(roster.count_assigned_task(Task::Scrambler, "444", group) <= 1);
                assert!(roster.count_assigned_task(Task::Runner, "444", group) <= 1);
                assert!(roster.count_assigned_task(Task::Judge, "444", group) <= 4);
            }
            for competitor in roster.iter() {
                let label = competitor.label("444");
                let group = label.group().unwrap();
                assert!((1..=6).contains(&group));
                assert!(label.tasks().len() <= 1);
                assert!(label.tasks().iter().all(|&(_, g)| g != group));
            }
            assert!(roster.iter().all(|c| c.is_staff()));
        }
    }

    #[test]
    fn test_duty_targets_next_slot_on_same_stage() {
        let persons = persons(12);
        let staff = staff_for(&persons, 12, 0);
        let mut roster = Roster::from_persons(persons, &["333", "444"]);
        let config = EventConfiguration::new(2, 2).with_staff(1, 0, 0);

        assign_advanced(
            &mut roster,
            &events(),
            "444",
            &config,
            &GeneralConfiguration::default(),
            &staff,
            &mut SmallRng::seed_from_u64(1),
        )
        .unwrap();

        let mut scramblers: Vec<String> = roster
            .iter()
            .map(|c| c.label("444"))
            .filter(|l| l.has_tasks())
            .map(|l| l.to_string())
            .collect();
        scramblers.sort();
        assert_eq!(scramblers, vec!["1;S3", "2;S4", "3;S1", "4;S2"]);
    }

    #[test]
    fn test_no_eligible_scramblers_warns() {
        let persons = persons(20);
        let staff = staff_for(&persons, 0, 20);
        let mut roster = Roster::from_persons(persons, &["333", "444"]);
        let config = EventConfiguration::new(2, 1).with_staff(2, 2, 16);

        let warnings = assign_advanced(
            &mut roster,
            &events(),
            "333",
            &config,
            &GeneralConfiguration::default(),
            &staff,
            &mut SmallRng::seed_from_u64(5),
        )
        .unwrap();

        assert_eq!(
            warnings,
            vec![GroupingWarning::ScramblerShortfall {
                event_id: "333".into(),
                available: 0,
                needed: 4,
            }]
        );
        for group in 1..=2 {
            assert_eq!(roster.count_assigned_task(Task::Scrambler, "333", group), 0);
            assert_eq!(roster.count_assigned_task(Task::Runner, "333", group), 2);
        }
        assert_eq!(roster.competing_indices("333").len(), 20);
    }

    #[test]
    fn test_judging_disabled() {
        let persons = persons(10);
        let staff = staff_for(&persons, 0, 0);
        let mut roster = Roster::from_persons(persons, &["333", "444"]);
        let config = EventConfiguration::new(2, 1).with_staff(0, 0, 16);
        let general = GeneralConfiguration {
            do_not_assign_judges: true,
            ..GeneralConfiguration::default()
        };

        assign_advanced(&mut roster, &events(), "444", &config, &general, &staff, &mut SmallRng::seed_from_u64(2))
            .unwrap();
        assert!(roster.iter().all(|c| !c.label("444").has_tasks()));
    }

    #[test]
    fn test_delegates_do_not_judge() {
        let mut persons = persons(6);
        persons[0] = persons[0].clone().with_role("delegate");
        let staff = staff_for(&persons, 0, 0);
        let mut roster = Roster::from_persons(persons, &["333", "444"]);
        let config = EventConfiguration::new(2, 1).with_staff(0, 0, 16);

        assign_advanced(
            &mut roster,
            &events(),
            "444",
            &config,
            &GeneralConfiguration::default(),
            &staff,
            &mut SmallRng::seed_from_u64(4),
        )
        .unwrap();

        let delegate = roster.iter().find(|c| c.person().registrant_id == 0).unwrap();
        assert!(!delegate.label("444").has_tasks());
        let judges: usize = (1..=2).map(|g| roster.count_assigned_task(Task::Judge, "444", g)).sum();
        assert_eq!(judges, 5);
    }

    #[test]
    fn test_zero_groups_is_inconsistent() {
        let persons = persons(4);
        let staff = staff_for(&persons, 4, 0);
        let mut roster = Roster::from_persons(persons, &["333", "444"]);
        let config = EventConfiguration::new(0, 1);

        let result = assign_advanced(
            &mut roster,
            &events(),
            "333",
            &config,
            &GeneralConfiguration::default(),
            &staff,
            &mut SmallRng::seed_from_u64(0),
        );
        assert!(matches!(result, Err(GroupingError::Consistency(_))));
        assert!(roster.iter().all(|c| c.label("333") == Label::competing(1)));
    }
}
