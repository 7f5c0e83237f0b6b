//! Land claim management.
//!
//! A claim reserves a spot in one of the game dimensions for a user. The
//! module is split the same way as the todo side:
//!
//! - [`Claim`] and [`Dimension`]: the persisted model.
//! - [`ClaimStore`]: the query contracts against the claims table.
//! - [`ClaimValidator`]: the domain rules (exclusion radius, per-user cap)
//!   enforced in front of the store.
//!
//! Claims never expire; they are created by the `claims create` command
//! and removed explicitly by `claims remove`.

mod claim;
mod store;
mod validator;

pub use crate::claims::claim::{Claim, ClaimFilter, Dimension};
pub use crate::claims::store::ClaimStore;
pub use crate::claims::validator::{ClaimRules, ClaimValidator};
