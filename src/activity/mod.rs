//! Append-only audit trail of every casework mutation.
//!
//! Entries are written through the same store transaction as the change
//! they describe, so a mutation and its log entry commit or roll back
//! together.

pub mod domain;
pub mod services;
