//! Grouping engine.
//!
//! Computes, for one event at a time, the label of every competing person
//! under the configured [`GroupStrategy`]:
//!
//! - **Basic**: random groups, see [`basic::assign_random`].
//! - **BasicBySpeed** / **BasicBySpeedReverse**: contiguous chunks by
//!   personal best, see [`basic::assign_by_speed`].
//! - **Advanced**: random groups with scramblers, runners and judges, see
//!   [`advanced::assign_advanced`]. Needs a staff roster.
//!
//! # Usage
//!
//! ```
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//! use u_grouping::config::{EventConfiguration, GeneralConfiguration};
//! use u_grouping::grouping::GroupingEngine;
//! use u_grouping::models::{Event, Person};
//! use u_grouping::roster::Roster;
//!
//! let persons = (1..=6)
//!     .map(|i| Person::new(i, format!("P{i}")).with_events(&["333"]))
//!     .collect();
//! let mut roster = Roster::from_persons(persons, &["333"]);
//! let events = vec![Event::new("333", 1).with_configuration(EventConfiguration::new(2, 1))];
//! let configuration = GeneralConfiguration::default();
//!
//! let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);
//! let report = engine.generate("333", None, &mut SmallRng::seed_from_u64(42)).unwrap();
//! assert_eq!(report.kpi.total_competitors(), 6);
//! ```

pub mod advanced;
pub mod basic;
pub mod counter;
pub mod fairness;
pub mod kpi;
pub mod reposition;

use std::borrow::Cow;

use rand::Rng;

use crate::config::{GeneralConfiguration, GroupStrategy};
use crate::error::{GroupingError, Result};
use crate::models::Event;
use crate::roster::{Roster, RosterQuery};
use crate::staff::StaffRoster;

pub use kpi::{GroupCounts, GroupingKpi};

/// Non-fatal problem found while grouping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupingWarning {
    #[error("not enough scramblers for {event_id}: {available} eligible, {needed} needed")]
    ScramblerShortfall {
        event_id: String,
        available: usize,
        needed: usize,
    },
    #[error("not enough runners for {event_id}: {available} eligible, {needed} needed")]
    RunnerShortfall {
        event_id: String,
        available: usize,
        needed: usize,
    },
}

/// Outcome of grouping one event.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingReport {
    pub event_id: String,
    pub strategy: GroupStrategy,
    /// The event is configured to be skipped; labels were left untouched.
    pub skipped: bool,
    pub warnings: Vec<GroupingWarning>,
    pub kpi: GroupingKpi,
}

/// Whether policy allows a person to judge.
pub(crate) fn can_judge(roster: &Roster, index: usize, configuration: &GeneralConfiguration) -> bool {
    let Some(competitor) = roster.get(index) else {
        return false;
    };
    if configuration.do_not_assign_tasks_to_new_competitors && competitor.person().is_newcomer() {
        return false;
    }
    !(configuration.skip_delegates_and_organizers && roster.is_organizer_or_delegate(index))
}

/// Runs grouping strategies over a roster.
///
/// Borrows the roster mutably for its lifetime; callers group one event at
/// a time.
pub struct GroupingEngine<'a> {
    roster: &'a mut Roster,
    events: &'a [Event],
    configuration: &'a GeneralConfiguration,
}

impl<'a> GroupingEngine<'a> {
    /// `events` must carry configurations and be in start-time order.
    pub fn new(roster: &'a mut Roster, events: &'a [Event], configuration: &'a GeneralConfiguration) -> Self {
        Self {
            roster,
            events,
            configuration,
        }
    }

    /// Groups one event with the configured strategy.
    ///
    /// The roster is sorted by name afterwards.
    ///
    /// # Errors
    /// - [`GroupingError::UnknownEvent`] if the event or its configuration is missing
    /// - [`GroupingError::MissingStaff`] if the advanced strategy has no staff source
    /// - [`GroupingError::Consistency`] if repositioning finds corrupt input
    pub fn generate<R: Rng>(
        &mut self,
        event_id: &str,
        staff: Option<&StaffRoster>,
        rng: &mut R,
    ) -> Result<GroupingReport> {
        let events = self.events;
        let event = events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| GroupingError::UnknownEvent(event_id.to_string()))?;
        let configuration = event.config()?;
        let strategy = self.configuration.group_strategy;

        let mut report = GroupingReport {
            event_id: event_id.to_string(),
            strategy,
            skipped: configuration.skip,
            warnings: Vec::new(),
            kpi: GroupingKpi::default(),
        };

        if configuration.skip {
            tracing::debug!(event_id, "event is skipped");
        } else {
            match strategy {
                GroupStrategy::Basic => basic::assign_random(
                    self.roster,
                    event_id,
                    configuration,
                    self.configuration.top_competitors,
                    rng,
                )?,
                GroupStrategy::BasicBySpeed => basic::assign_by_speed(self.roster, event_id, configuration, false),
                GroupStrategy::BasicBySpeedReverse => {
                    basic::assign_by_speed(self.roster, event_id, configuration, true)
                }
                GroupStrategy::Advanced => {
                    let staff = self.resolve_staff(staff)?;
                    report.warnings = advanced::assign_advanced(
                        self.roster,
                        events,
                        event_id,
                        configuration,
                        self.configuration,
                        &staff,
                        rng,
                    )?;
                }
            }
            self.roster.sort_by_name();
        }

        report.kpi = GroupingKpi::calculate(&*self.roster, event_id, configuration.number_of_groups());
        Ok(report)
    }

    /// Groups every event in start-time order, stopping at the first error.
    pub fn generate_all<R: Rng>(&mut self, staff: Option<&StaffRoster>, rng: &mut R) -> Result<Vec<GroupingReport>> {
        let events = self.events;
        events
            .iter()
            .map(|event| self.generate(&event.id, staff, rng))
            .collect()
    }

    /// Staff source for the advanced strategy, in order of precedence.
    fn resolve_staff<'s>(&self, staff: Option<&'s StaffRoster>) -> Result<Cow<'s, StaffRoster>> {
        if self.configuration.everyone_can_scramble_and_run {
            return Ok(Cow::Owned(StaffRoster::everyone(&*self.roster)));
        }
        if let Some(staff) = staff {
            return Ok(Cow::Borrowed(staff));
        }
        if self.configuration.auto_pick_scramblers_and_runners {
            let event_ids = self.events.iter().map(|e| e.id.as_str());
            return Ok(Cow::Owned(StaffRoster::from_personal_bests(&*self.roster, event_ids)));
        }
        Err(GroupingError::MissingStaff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventConfiguration;
    use crate::label::Label;
    use crate::models::Person;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn persons(n: i64) -> Vec<Person> {
        (0..n)
            .map(|i| {
                Person::new(i, format!("P{:02}", n - i))
                    .with_wca_id(format!("2016COMP{i:02}"))
                    .with_events(&["333", "666"])
                    .with_single("333", 800 + i * 7)
            })
            .collect()
    }

    fn events() -> Vec<Event> {
        vec![
            Event::new("333", 1).with_configuration(EventConfiguration::new(2, 1)),
            Event::new("666", 1).with_configuration(EventConfiguration::new(2, 1).with_skip(true)),
        ]
    }

    #[test]
    fn test_basic_twenty_competitors() {
        let mut roster = Roster::from_persons(persons(20), &["333", "666"]);
        let events = events();
        let configuration = GeneralConfiguration::default();
        let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);

        let report = engine.generate("333", None, &mut SmallRng::seed_from_u64(11)).unwrap();
        assert!(!report.skipped);
        assert!(report.warnings.is_empty());
        let one = report.kpi.group(1).unwrap().competitors;
        let two = report.kpi.group(2).unwrap().competitors;
        assert_eq!(one + two, 20);
        assert!(one.abs_diff(two) <= 1);

        let names: Vec<&str> = roster.iter().map(|c| c.name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_skipped_event_is_untouched() {
        let mut roster = Roster::from_persons(persons(4), &["333", "666"]);
        let before = roster.clone();
        let events = events();
        let configuration = GeneralConfiguration::default();
        let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);

        let report = engine.generate("666", None, &mut SmallRng::seed_from_u64(0)).unwrap();
        assert!(report.skipped);
        assert_eq!(roster, before);
    }

    #[test]
    fn test_unknown_event() {
        let mut roster = Roster::from_persons(persons(2), &["333", "666"]);
        let events = events();
        let configuration = GeneralConfiguration::default();
        let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);
        assert!(matches!(
            engine.generate("777", None, &mut SmallRng::seed_from_u64(0)),
            Err(GroupingError::UnknownEvent(_))
        ));
    }

    #[test]
    fn test_advanced_without_staff_source_fails() {
        let mut roster = Roster::from_persons(persons(4), &["333", "666"]);
        let events = events();
        let configuration = GeneralConfiguration::default().with_strategy(GroupStrategy::Advanced);
        let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);
        assert!(matches!(
            engine.generate("333", None, &mut SmallRng::seed_from_u64(0)),
            Err(GroupingError::MissingStaff)
        ));
    }

    #[test]
    fn test_advanced_with_auto_picked_staff() {
        let mut roster = Roster::from_persons(persons(16), &["333", "666"]);
        let events = events();
        let configuration = GeneralConfiguration {
            auto_pick_scramblers_and_runners: true,
            ..GeneralConfiguration::default().with_strategy(GroupStrategy::Advanced)
        };
        let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);

        let report = engine.generate("333", None, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert!(report.warnings.is_empty());
        for group in report.kpi.groups.iter() {
            assert_eq!(group.scramblers, 2);
            assert_eq!(group.runners, 2);
        }
        assert!(roster.iter().all(|c| c.is_staff()));
    }

    #[test]
    fn test_everyone_can_scramble_overrides_given_staff() {
        let mut roster = Roster::from_persons(persons(10), &["333", "666"]);
        let events = events();
        let configuration = GeneralConfiguration {
            everyone_can_scramble_and_run: true,
            ..GeneralConfiguration::default().with_strategy(GroupStrategy::Advanced)
        };
        let empty = StaffRoster::default();
        let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);

        let report = engine.generate("333", Some(&empty), &mut SmallRng::seed_from_u64(3)).unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.kpi.groups.iter().map(|g| g.scramblers).sum::<usize>(), 4);
    }

    #[test]
    fn test_generate_all_in_event_order() {
        let mut roster = Roster::from_persons(persons(6), &["333", "666"]);
        let events = events();
        let configuration = GeneralConfiguration::default().with_strategy(GroupStrategy::BasicBySpeed);
        let mut engine = GroupingEngine::new(&mut roster, &events, &configuration);

        let reports = engine.generate_all(None, &mut SmallRng::seed_from_u64(0)).unwrap();
        let ids: Vec<&str> = reports.iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, vec!["333", "666"]);
        assert!(reports[1].skipped);

        let fastest = roster.iter().find(|c| c.person().registrant_id == 0).unwrap();
        assert_eq!(fastest.label("333"), Label::competing(1));
    }

    #[test]
    fn test_can_judge_policies() {
        let roster = Roster::from_persons(
            vec![
                Person::new(1, "New").with_events(&["333"]),
                Person::new(2, "Org").with_wca_id("2010ORGA01").with_events(&["333"]).with_role("organizer"),
            ],
            &["333"],
        );
        let default = GeneralConfiguration::default();
        assert!(can_judge(&roster, 0, &default));
        assert!(!can_judge(&roster, 1, &default));

        let strict = GeneralConfiguration {
            do_not_assign_tasks_to_new_competitors: true,
            skip_delegates_and_organizers: false,
            ..GeneralConfiguration::default()
        };
        assert!(!can_judge(&roster, 0, &strict));
        assert!(can_judge(&roster, 1, &strict));
    }
}
