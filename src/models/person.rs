//! Person and assignment models.
//!
//! A person is a registrant of the competition. After synchronization each
//! person carries a list of formal assignment records, one per group they
//! compete in or staff.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::label::Task;

/// Roles that mark a person as part of the competition leadership.
const LEADERSHIP_ROLES: [&str; 3] = ["delegate", "trainee-delegate", "organizer"];

/// A registrant of the competition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Registration identifier; unique among registered persons.
    pub registrant_id: i64,
    /// Full name as registered.
    pub name: String,
    /// Official competitor id. `None` for newcomers.
    #[serde(default)]
    pub wca_id: Option<String>,
    /// Registration details.
    #[serde(default)]
    pub registration: Option<Registration>,
    /// Roles within the competition (delegate, organizer, ...).
    #[serde(default)]
    pub roles: Vec<String>,
    /// Recorded personal bests.
    #[serde(default)]
    pub personal_bests: Vec<PersonalBest>,
    /// Formal assignments. Rebuilt on every synchronization.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// Unrecognised fields, preserved on round trip.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Person {
    /// Creates a person with no registration.
    pub fn new(registrant_id: i64, name: impl Into<String>) -> Self {
        Self {
            registrant_id,
            name: name.into(),
            wca_id: None,
            registration: None,
            roles: Vec::new(),
            personal_bests: Vec::new(),
            assignments: Vec::new(),
            other: Map::new(),
        }
    }

    /// Sets the official competitor id.
    pub fn with_wca_id(mut self, wca_id: impl Into<String>) -> Self {
        self.wca_id = Some(wca_id.into());
        self
    }

    /// Registers the person (accepted) for the given events.
    pub fn with_events(mut self, event_ids: &[&str]) -> Self {
        self.registration = Some(Registration::accepted(event_ids));
        self
    }

    /// Adds a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Adds a single-result personal best (centiseconds).
    pub fn with_single(mut self, event_id: impl Into<String>, best: i64) -> Self {
        self.personal_bests.push(PersonalBest::single(event_id, best));
        self
    }

    /// Whether the registration is accepted.
    pub fn is_accepted(&self) -> bool {
        self.registration
            .as_ref()
            .is_some_and(|r| r.status == Registration::ACCEPTED)
    }

    /// Whether the person has no official record of prior competition.
    pub fn is_newcomer(&self) -> bool {
        self.wca_id.as_deref().map_or(true, str::is_empty)
    }

    /// Whether the person is a delegate or organizer.
    pub fn is_organizer_or_delegate(&self) -> bool {
        self.roles
            .iter()
            .any(|r| LEADERSHIP_ROLES.contains(&r.as_str()))
    }

    /// Whether the person registered for the event.
    pub fn is_registered_for(&self, event_id: &str) -> bool {
        self.registration
            .as_ref()
            .is_some_and(|r| r.event_ids.iter().any(|e| e == event_id))
    }

    /// Fastest recorded single result in an event.
    pub fn personal_best(&self, event_id: &str) -> Option<i64> {
        self.personal_bests
            .iter()
            .filter(|pb| pb.event_id == event_id && pb.kind == PersonalBest::SINGLE && pb.best > 0)
            .map(|pb| pb.best)
            .min()
    }

    /// Name without the local-script suffix: "Jan Kowalski (Ян Ковальски)" → "Jan Kowalski".
    pub fn display_name(&self) -> &str {
        self.name.split('(').next().unwrap_or_default().trim_end()
    }
}

/// Registration details of a person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub status: String,
    #[serde(default)]
    pub event_ids: Vec<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Registration {
    pub const ACCEPTED: &'static str = "accepted";

    /// An accepted registration for the given events.
    pub fn accepted(event_ids: &[&str]) -> Self {
        Self {
            status: Self::ACCEPTED.to_string(),
            event_ids: event_ids.iter().map(|e| e.to_string()).collect(),
            other: Map::new(),
        }
    }
}

/// A recorded personal best.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBest {
    pub event_id: String,
    /// Result value (centiseconds for timed events).
    pub best: i64,
    /// "single" or "average".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl PersonalBest {
    pub const SINGLE: &'static str = "single";

    pub fn single(event_id: impl Into<String>, best: i64) -> Self {
        Self {
            event_id: event_id.into(),
            best,
            kind: Self::SINGLE.to_string(),
            other: Map::new(),
        }
    }
}

/// A formal assignment record.
///
/// Serialized bit-exact as
/// `{"activityId": int, "stationNumber": int|null, "assignmentCode": string}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub activity_id: i64,
    pub station_number: Option<i64>,
    pub assignment_code: AssignmentCode,
}

impl Assignment {
    /// A competitor assignment at a station.
    pub fn competitor(activity_id: i64, station_number: i64) -> Self {
        Self {
            activity_id,
            station_number: Some(station_number),
            assignment_code: AssignmentCode::Competitor,
        }
    }

    /// A staff assignment (no station).
    pub fn staff(activity_id: i64, task: Task) -> Self {
        Self {
            activity_id,
            station_number: None,
            assignment_code: AssignmentCode::from(task),
        }
    }
}

/// Kind of assignment.
///
/// Codes outside the known set are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssignmentCode {
    Competitor,
    StaffJudge,
    StaffScrambler,
    StaffRunner,
    StaffDataEntry,
    StaffAnnouncer,
    Other(String),
}

impl AssignmentCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Competitor => "competitor",
            Self::StaffJudge => "staff-judge",
            Self::StaffScrambler => "staff-scrambler",
            Self::StaffRunner => "staff-runner",
            Self::StaffDataEntry => "staff-dataentry",
            Self::StaffAnnouncer => "staff-announcer",
            Self::Other(code) => code,
        }
    }

    /// The staffing task of this code; `None` for competitors and unknown codes.
    pub fn task(&self) -> Option<Task> {
        match self {
            Self::StaffJudge => Some(Task::Judge),
            Self::StaffScrambler => Some(Task::Scrambler),
            Self::StaffRunner => Some(Task::Runner),
            Self::StaffDataEntry => Some(Task::DataEntry),
            Self::StaffAnnouncer => Some(Task::Announcer),
            Self::Competitor | Self::Other(_) => None,
        }
    }
}

impl From<Task> for AssignmentCode {
    fn from(task: Task) -> Self {
        match task {
            Task::Judge => Self::StaffJudge,
            Task::Scrambler => Self::StaffScrambler,
            Task::Runner => Self::StaffRunner,
            Task::DataEntry => Self::StaffDataEntry,
            Task::Announcer => Self::StaffAnnouncer,
        }
    }
}

impl From<String> for AssignmentCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "competitor" => Self::Competitor,
            "staff-judge" => Self::StaffJudge,
            "staff-scrambler" => Self::StaffScrambler,
            "staff-runner" => Self::StaffRunner,
            "staff-dataentry" => Self::StaffDataEntry,
            "staff-announcer" => Self::StaffAnnouncer,
            _ => Self::Other(code),
        }
    }
}

impl From<AssignmentCode> for String {
    fn from(code: AssignmentCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for AssignmentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_from_document() {
        let person: Person = serde_json::from_value(json!({
            "registrantId": 4,
            "name": "Anna Nowak (Анна Новак)",
            "wcaId": "2015NOWA01",
            "countryIso2": "PL",
            "registration": { "status": "accepted", "eventIds": ["333", "pyram"], "wcaRegistrationId": 12 },
            "roles": ["organizer"],
            "personalBests": [
                { "eventId": "333", "best": 1034, "type": "average", "worldRanking": 9000 },
                { "eventId": "333", "best": 876, "type": "single", "worldRanking": 8000 }
            ],
            "assignments": []
        }))
        .unwrap();

        assert!(person.is_accepted());
        assert!(!person.is_newcomer());
        assert!(person.is_organizer_or_delegate());
        assert!(person.is_registered_for("pyram"));
        assert!(!person.is_registered_for("444"));
        assert_eq!(person.personal_best("333"), Some(876));
        assert_eq!(person.personal_best("pyram"), None);
        assert_eq!(person.display_name(), "Anna Nowak");
        assert_eq!(person.other["countryIso2"], "PL");
    }

    #[test]
    fn test_newcomer() {
        assert!(Person::new(1, "New").is_newcomer());
        assert!(Person::new(1, "New").with_wca_id("").is_newcomer());
        assert!(!Person::new(1, "Old").with_wca_id("2010ABCD01").is_newcomer());
    }

    #[test]
    fn test_assignment_wire_format() {
        let staff = Assignment::staff(12, Task::Judge);
        assert_eq!(
            serde_json::to_value(&staff).unwrap(),
            json!({ "activityId": 12, "stationNumber": null, "assignmentCode": "staff-judge" })
        );

        let competitor = Assignment::competitor(12, 3);
        assert_eq!(
            serde_json::to_value(&competitor).unwrap(),
            json!({ "activityId": 12, "stationNumber": 3, "assignmentCode": "competitor" })
        );
    }

    #[test]
    fn test_unknown_assignment_code_survives() {
        let a: Assignment = serde_json::from_value(json!({
            "activityId": 1, "stationNumber": null, "assignmentCode": "staff-delegate"
        }))
        .unwrap();
        assert_eq!(a.assignment_code, AssignmentCode::Other("staff-delegate".into()));
        assert_eq!(a.assignment_code.task(), None);
        assert_eq!(serde_json::to_value(&a).unwrap()["assignmentCode"], "staff-delegate");
    }

    #[test]
    fn test_code_task_mapping() {
        for task in Task::ALL {
            assert_eq!(AssignmentCode::from(task).task(), Some(task));
        }
        assert_eq!(AssignmentCode::Competitor.task(), None);
    }
}
