//! Identifier types for the case domain.

use crate::ids::uuid_id;

uuid_id! {
    /// Unique identifier for a case.
    CaseId
}

uuid_id! {
    /// Reference to the client a case is billed to.
    ClientId
}

uuid_id! {
    /// Reference to the template a case was instantiated from.
    TemplateId
}
