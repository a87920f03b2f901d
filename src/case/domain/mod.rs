//! Domain model for case lifecycle management.
//!
//! A case is the billable unit of client work. Its state only changes through
//! [`Case::transition_to`], which enforces the canonical transition table
//! and the progress gates.

mod case;
mod error;
mod ids;
mod state;

pub use case::{Case, CaseDetails, PersistedCaseData};
pub use error::{ParseCasePriorityError, ParseCaseStateError};
pub use ids::{CaseId, ClientId, TemplateId};
pub use state::{CasePriority, CaseState};
