//! Staff roster: who may scramble which event, and who may run.
//!
//! The roster comes from a CSV sheet kept by the organizers, or is derived
//! from personal bests when no sheet is available. It is only consulted by
//! the advanced grouping strategy and never written into the document.
//!
//! # CSV Format
//!
//! ```text
//! name,wcaId,run,222,333,444,...
//! Jane Doe,2012DOEJ01,x,x,x,
//! ```
//!
//! The delimiter is `,` or `;`, detected from the text. Cells may be
//! quoted. A non-empty cell grants the permission of its column.

use std::collections::BTreeSet;

use crate::error::{GroupingError, Result};
use crate::roster::{Roster, RosterQuery};

/// Permission column for running.
pub const RUN: &str = "run";

/// Disciplines that must appear as CSV columns.
pub const DISCIPLINES: [&str; 16] = [
    "222", "333", "444", "555", "666", "777", "333bf", "333oh", "clock", "minx", "pyram", "skewb",
    "sq1", "444bf", "555bf", "333mbf",
];

const SCRAMBLE_EVERYTHING: &str = "scrambleEverything";

/// One person on the staff roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub name: String,
    pub wca_id: String,
    /// Event ids this person may scramble, plus `run`.
    pub is_allowed_to: BTreeSet<String>,
}

impl StaffMember {
    pub fn new(name: impl Into<String>, wca_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wca_id: wca_id.into(),
            is_allowed_to: BTreeSet::new(),
        }
    }

    /// Grants a permission (an event id or [`RUN`]).
    pub fn allow(mut self, permission: impl Into<String>) -> Self {
        self.is_allowed_to.insert(permission.into());
        self
    }

    pub fn can_scramble(&self, event_id: &str) -> bool {
        self.is_allowed_to.contains(SCRAMBLE_EVERYTHING) || self.is_allowed_to.contains(event_id)
    }

    pub fn can_run(&self) -> bool {
        self.is_allowed_to.contains(RUN)
    }
}

/// The staff roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffRoster {
    members: Vec<StaffMember>,
}

impl StaffRoster {
    pub fn new(members: Vec<StaffMember>) -> Self {
        Self { members }
    }

    /// Parses the organizers' CSV sheet.
    ///
    /// # Errors
    /// [`GroupingError::Format`] if no delimiter can be detected or a
    /// required header is missing. Nothing is returned in that case.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut reader = csv_reader(text)?;
        let headers = reader.headers()?.clone();

        for expected in ["name", "wcaId", RUN].into_iter().chain(DISCIPLINES) {
            if !headers.iter().any(|h| h == expected) {
                return Err(GroupingError::Format(format!(
                    "expected header {expected} in the staff CSV, but it was not present"
                )));
            }
        }
        let column = |header: &str| headers.iter().position(|h| h == header);

        let mut members = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() < 2 {
                continue;
            }
            let cell = |header: &str| {
                column(header)
                    .and_then(|i| record.get(i))
                    .unwrap_or_default()
            };

            let mut member = StaffMember::new(cell("name"), cell("wcaId"));
            for permission in std::iter::once(RUN).chain(DISCIPLINES) {
                if !cell(permission).is_empty() {
                    member.is_allowed_to.insert(permission.to_string());
                }
            }
            members.push(member);
        }

        tracing::info!(members = members.len(), "parsed staff roster");
        Ok(Self { members })
    }

    /// Everyone may scramble every event and run.
    pub fn everyone(roster: &Roster) -> Self {
        let members = roster
            .iter()
            .filter_map(|c| c.person().wca_id.clone().map(|id| (c.name().to_string(), id)))
            .map(|(name, id)| StaffMember::new(name, id).allow(SCRAMBLE_EVERYTHING).allow(RUN))
            .collect();
        Self { members }
    }

    /// Picks scramblers by personal best: a person may scramble an event if
    /// their single ranks in the faster half of the event's competitors with
    /// a result. Everyone with an official id may run.
    pub fn from_personal_bests<'a>(roster: &Roster, event_ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut members: Vec<StaffMember> = roster
            .iter()
            .filter_map(|c| c.person().wca_id.clone().map(|id| (c.name().to_string(), id)))
            .map(|(name, id)| StaffMember::new(name, id).allow(RUN))
            .collect();

        for event_id in event_ids {
            let ranked = roster.top_competitors_by_speed(event_id, usize::MAX);
            let fast_half = ranked.len().div_ceil(2);
            for &index in &ranked[..fast_half] {
                let Some(wca_id) = roster.get(index).and_then(|c| c.person().wca_id.as_deref()) else {
                    continue;
                };
                if let Some(member) = members.iter_mut().find(|m| m.wca_id == wca_id) {
                    member.is_allowed_to.insert(event_id.to_string());
                }
            }
        }
        Self { members }
    }

    pub fn members(&self) -> &[StaffMember] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Official ids of all staff members.
    pub fn wca_ids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.wca_id.as_str()).collect()
    }

    /// The unique member with this official id.
    fn member(&self, wca_id: Option<&str>) -> Option<&StaffMember> {
        let wca_id = wca_id.filter(|id| !id.is_empty())?;
        let mut matches = self.members.iter().filter(|m| m.wca_id == wca_id);
        match (matches.next(), matches.next()) {
            (Some(member), None) => Some(member),
            _ => None,
        }
    }

    pub fn can_scramble(&self, wca_id: Option<&str>, event_id: &str) -> bool {
        self.member(wca_id).is_some_and(|m| m.can_scramble(event_id))
    }

    pub fn can_run(&self, wca_id: Option<&str>) -> bool {
        self.member(wca_id).is_some_and(StaffMember::can_run)
    }
}

/// Detects the CSV delimiter: `,` if present, else `;`.
pub(crate) fn detect_separator(text: &str) -> Result<char> {
    [',', ';']
        .into_iter()
        .find(|&c| text.contains(c))
        .ok_or_else(|| {
            GroupingError::Format("could not determine separator (, or ;) in CSV text".into())
        })
}

/// A reader over `text` with the detected delimiter. The first record is
/// the header row; cells are trimmed and rows may differ in length.
pub(crate) fn csv_reader(text: &str) -> Result<csv::Reader<&[u8]>> {
    let separator = detect_separator(text)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(separator as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes()))
}
