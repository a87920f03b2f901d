//! Caller identity supplied by the authentication collaborator.
//!
//! The core never authenticates anyone. Every command carries an [`Actor`]
//! describing who is calling and whether they hold elevated privileges, and
//! the state machines decide what that actor may do.

use crate::ids::uuid_id;
use serde::{Deserialize, Serialize};

uuid_id! {
    /// Identifier of a staff operator.
    OperatorId
}

/// Privilege level attached to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Regular operator: may act on cases and tasks assigned to them.
    Operator,
    /// Supervisor or administrator: may act on anything, including invoicing.
    Elevated,
}

/// Authenticated caller of a core operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    operator_id: OperatorId,
    role: ActorRole,
}

impl Actor {
    /// Creates a regular operator actor.
    #[must_use]
    pub const fn operator(operator_id: OperatorId) -> Self {
        Self {
            operator_id,
            role: ActorRole::Operator,
        }
    }

    /// Creates an actor with elevated privileges.
    #[must_use]
    pub const fn elevated(operator_id: OperatorId) -> Self {
        Self {
            operator_id,
            role: ActorRole::Elevated,
        }
    }

    /// Returns the operator behind this actor.
    #[must_use]
    pub const fn operator_id(&self) -> OperatorId {
        self.operator_id
    }

    /// Returns the actor's privilege level.
    #[must_use]
    pub const fn role(&self) -> ActorRole {
        self.role
    }

    /// Returns `true` when the actor holds elevated privileges.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        matches!(self.role, ActorRole::Elevated)
    }

    /// Returns `true` when the actor is elevated or is one of `assignees`.
    #[must_use]
    pub fn may_act_for(&self, assignees: &[Option<OperatorId>]) -> bool {
        self.is_elevated()
            || assignees
                .iter()
                .flatten()
                .any(|assignee| *assignee == self.operator_id)
    }
}
