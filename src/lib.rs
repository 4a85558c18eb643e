//! Competition grouping framework.
//!
//! Assigns competitors and support staff (scramblers, runners, judges) to
//! time-boxed groups within the rounds of a multi-stage competition, and
//! synchronizes those assignments with the shared competition document.
//!
//! # Modules
//!
//! - **`models`**: Document types: `Competition`, `Event`, `Person`,
//!   `Activity`, `Schedule`, `Assignment`
//! - **`label`**: The compact group/task label (`"2;S3"`) and its codec
//! - **`expansion`**: Splitting rounds into per-group, per-stage activities
//! - **`roster`**: Normalized competitor roster and read-only queries
//! - **`grouping`**: Grouping strategies, capacity counters and KPIs
//! - **`staff`**: Staff roster from CSV or personal bests
//! - **`sync`**: Labels to assignment records and back
//! - **`session`**: End-to-end workflow over one document
//! - **`config`**, **`validation`**, **`error`**: Policy, input checks, errors
//!
//! # Example
//!
//! ```no_run
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//! use u_grouping::{GeneralConfiguration, GroupingSession};
//!
//! # fn main() -> u_grouping::Result<()> {
//! let json = std::fs::read_to_string("competition.json").expect("document");
//! let mut session = GroupingSession::from_json(&json, GeneralConfiguration::default())?;
//! session.expand_activities()?;
//! session.generate_all(None, &mut SmallRng::seed_from_u64(7))?;
//! session.export_assignments()?;
//! let document = session.into_document();
//! # let _ = document;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The core is synchronous and performs no I/O: it is handed decoded
//! documents and CSV text, and returns the updated document. Every
//! randomized step takes the random source as a parameter.

pub mod config;
pub mod error;
pub mod expansion;
pub mod grouping;
pub mod label;
pub mod models;
pub mod roster;
pub mod session;
pub mod staff;
pub mod sync;
pub mod validation;

pub use config::{EventConfiguration, GeneralConfiguration, GroupStrategy};
pub use error::{GroupingError, Result};
pub use grouping::{GroupingEngine, GroupingKpi, GroupingReport, GroupingWarning};
pub use label::{Label, Task};
pub use roster::Roster;
pub use session::GroupingSession;
pub use staff::StaffRoster;
