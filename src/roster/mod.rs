//! Normalized competitor roster.
//!
//! The roster owns the accepted persons of a competition together with
//! their per-event state (competing flag, group label, station). It is the
//! single writer of that state: the grouping engine and the synchronizer
//! mutate it only through the operations below.
//!
//! Indices into the roster are positions in its current order and are only
//! stable until the next [`Roster::shuffle`] or sort.

mod query;

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::label::Label;
use crate::models::{Assignment, Person};

pub use query::RosterQuery;

/// A person's state in one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventState {
    competing: bool,
    label: Label,
    station_number: Option<i64>,
    stage_color: Option<String>,
}

impl EventState {
    fn new(competing: bool) -> Self {
        Self {
            competing,
            label: if competing { Label::competing(1) } else { Label::empty() },
            station_number: None,
            stage_color: None,
        }
    }

    pub fn competing(&self) -> bool {
        self.competing
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Station assigned by the last export.
    pub fn station_number(&self) -> Option<i64> {
        self.station_number
    }

    /// Color of the room the person competes in.
    pub fn stage_color(&self) -> Option<&str> {
        self.stage_color.as_deref()
    }
}

/// An accepted person with their event states.
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    person: Person,
    is_staff: bool,
    events: BTreeMap<String, EventState>,
}

impl Competitor {
    fn new<'a>(person: Person, event_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let events = event_ids
            .into_iter()
            .map(|id| (id.to_string(), EventState::new(person.is_registered_for(id))))
            .collect();
        Self {
            person,
            is_staff: false,
            events,
        }
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    /// Name without the local-script suffix.
    pub fn name(&self) -> &str {
        self.person.display_name()
    }

    /// Name as registered.
    pub fn full_name(&self) -> &str {
        &self.person.name
    }

    /// Whether the person appears on the staff roster.
    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn state(&self, event_id: &str) -> Option<&EventState> {
        self.events.get(event_id)
    }

    pub fn is_competing(&self, event_id: &str) -> bool {
        self.state(event_id).is_some_and(EventState::competing)
    }

    /// Label in an event; empty for unknown events.
    pub fn label(&self, event_id: &str) -> Label {
        self.state(event_id)
            .map(|s| s.label.clone())
            .unwrap_or_default()
    }

    /// All (event id, state) pairs.
    pub fn events(&self) -> impl Iterator<Item = (&str, &EventState)> {
        self.events.iter().map(|(id, state)| (id.as_str(), state))
    }
}

/// The roster of accepted persons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    competitors: Vec<Competitor>,
}

impl Roster {
    /// Builds the roster from accepted persons, creating a state for every event.
    ///
    /// Persons without an accepted registration are left out. Competing
    /// persons start in group 1, everyone else with an empty label.
    pub fn from_persons(persons: Vec<Person>, event_ids: &[&str]) -> Self {
        let competitors = persons
            .into_iter()
            .filter(Person::is_accepted)
            .map(|p| Competitor::new(p, event_ids.iter().copied()))
            .collect();
        Self { competitors }
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Competitor> {
        self.competitors.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter()
    }

    /// Indices of persons competing in an event, in roster order.
    pub fn competing_indices(&self, event_id: &str) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.competitors[i].is_competing(event_id))
            .collect()
    }

    /// Finds a person by display or full name.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.competitors
            .iter()
            .position(|c| c.name() == name || c.full_name() == name)
    }

    /// Replaces a person's label in an event. Unknown events are ignored.
    pub fn assign_label(&mut self, index: usize, event_id: &str, label: Label) {
        if let Some(state) = self.state_mut(index, event_id) {
            state.label = label;
        }
    }

    /// Exchanges the labels of two persons in an event.
    pub fn swap_labels(&mut self, a: usize, b: usize, event_id: &str) {
        let label_a = self.competitors[a].label(event_id);
        let label_b = self.competitors[b].label(event_id);
        self.assign_label(a, event_id, label_b);
        self.assign_label(b, event_id, label_a);
    }

    /// Clears every label of every person.
    pub fn reset_labels(&mut self) {
        for competitor in &mut self.competitors {
            for state in competitor.events.values_mut() {
                state.label = Label::empty();
            }
        }
    }

    /// Records the station and room color a person was seated at.
    pub fn set_station(&mut self, index: usize, event_id: &str, station: i64, color: &str) {
        if let Some(state) = self.state_mut(index, event_id) {
            state.station_number = Some(station);
            state.stage_color = Some(color.to_string());
        }
    }

    /// Records the station without touching the color.
    pub(crate) fn set_station_number(&mut self, index: usize, event_id: &str, station: Option<i64>) {
        if let Some(state) = self.state_mut(index, event_id) {
            state.station_number = station;
        }
    }

    /// Marks persons whose official id appears in `wca_ids` as staff.
    pub fn mark_staff(&mut self, wca_ids: &[&str]) {
        for competitor in &mut self.competitors {
            competitor.is_staff = competitor
                .person
                .wca_id
                .as_deref()
                .is_some_and(|id| wca_ids.contains(&id));
        }
    }

    /// Uniform random permutation of the roster.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.competitors.shuffle(rng);
    }

    /// Stable sort by display name.
    pub fn sort_by_name(&mut self) {
        self.competitors.sort_by(|a, b| a.name().cmp(b.name()));
    }

    /// Stable sort by personal best in an event; persons without a result last.
    ///
    /// With `reverse`, the slowest come first (and persons without a result
    /// lead the list).
    pub fn sort_by_speed(&mut self, event_id: &str, reverse: bool) {
        let key = |c: &Competitor| c.person.personal_best(event_id).unwrap_or(i64::MAX);
        if reverse {
            self.competitors.sort_by_key(|c| std::cmp::Reverse(key(c)));
        } else {
            self.competitors.sort_by_key(key);
        }
    }

    /// Clears every person's assignment records.
    pub fn reset_assignments(&mut self) {
        for competitor in &mut self.competitors {
            competitor.person.assignments.clear();
        }
    }

    /// Appends an assignment record to a person.
    pub fn push_assignment(&mut self, index: usize, assignment: Assignment) {
        self.competitors[index].person.assignments.push(assignment);
    }

    /// Sorts a person's assignment records by assignment code.
    pub(crate) fn sort_assignments(&mut self, index: usize) {
        self.competitors[index]
            .person
            .assignments
            .sort_by(|a, b| a.assignment_code.as_str().cmp(b.assignment_code.as_str()));
    }

    /// Hands the persons back, e.g. to merge them into the document.
    pub fn into_persons(self) -> Vec<Person> {
        self.competitors.into_iter().map(|c| c.person).collect()
    }

    fn state_mut(&mut self, index: usize, event_id: &str) -> Option<&mut EventState> {
        self.competitors
            .get_mut(index)
            .and_then(|c| c.events.get_mut(event_id))
    }
}
