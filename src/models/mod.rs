//! Competition document models.
//!
//! Typed view of the shared schedule document the grouping engine reads and
//! writes back. Field names follow the interchange format (camelCase);
//! unknown fields survive a read/write cycle.
//!
//! # Document Shape
//!
//! | Type | Holds |
//! |------|-------|
//! | Competition | events, persons, schedule |
//! | Schedule | venues → rooms → activities → child activities |
//! | Person | registration, personal bests, assignments |
//! | Assignment | activity id, station number, assignment code |

mod activity;
mod competition;
mod person;

pub use activity::{Activity, ActivityCode, Room, Schedule, Venue, OTHER_ACTIVITY_PREFIX};
pub use competition::{Competition, Event, Round};
pub use person::{Assignment, AssignmentCode, Person, PersonalBest, Registration};
