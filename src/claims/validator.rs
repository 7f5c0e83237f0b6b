//! Domain rules for claim creation and removal.

use log::info;

use crate::claims::claim::{Claim, Dimension};
use crate::claims::store::ClaimStore;
use crate::db::DbError;
use crate::error::BotError;

/// Configurable claim invariants.
#[derive(Clone, Copy, Debug)]
pub struct ClaimRules {
    /// Exclusion radius in world units. Two claims in the same dimension
    /// may not be closer than this (Euclidean distance).
    pub radius: i64,
    /// Maximum claims a single user may hold per dimension.
    pub per_user_per_dimension: i64,
    /// When set, the radius check is skipped entirely.
    pub allow_intersecting: bool,
}

impl Default for ClaimRules {
    fn default() -> Self {
        ClaimRules {
            radius: 200,
            per_user_per_dimension: 1,
            allow_intersecting: false,
        }
    }
}

/// Enforces the claim invariants in front of the store.
///
/// Both checks and the insert run inside a single transaction, so a user's
/// own concurrent attempts are serialized and cannot both pass the cap.
#[derive(Clone)]
pub struct ClaimValidator {
    store: ClaimStore,
    rules: ClaimRules,
}

impl ClaimValidator {
    pub fn new(store: ClaimStore, rules: ClaimRules) -> Self {
        ClaimValidator { store, rules }
    }

    /// Creates a claim for `user_id` at `(claim_x, claim_y)`.
    ///
    /// # Errors
    ///
    /// * [`BotError::ClaimLimitExceeded`] when the user already holds
    ///   [`ClaimRules::per_user_per_dimension`] claims in `dimension`.
    /// * [`BotError::ClaimIntersects`] when an existing claim in the same
    ///   dimension lies within [`ClaimRules::radius`] and intersecting
    ///   claims are disallowed.
    pub async fn attempt_claim(
        &self,
        user_id: i64,
        claim_x: i64,
        claim_y: i64,
        dimension: Dimension,
    ) -> Result<Claim, BotError> {
        let mut tx = self.store.pool().begin().await.map_err(DbError::from)?;

        let held = ClaimStore::count_for_user_with(&mut *tx, user_id, dimension).await?;
        if held >= self.rules.per_user_per_dimension {
            return Err(BotError::ClaimLimitExceeded {
                dimension,
                limit: self.rules.per_user_per_dimension,
            });
        }

        if !self.rules.allow_intersecting {
            let hits = ClaimStore::intersecting_with(
                &mut *tx,
                claim_x,
                claim_y,
                dimension,
                self.rules.radius,
            )
            .await?;
            if !hits.is_empty() {
                return Err(BotError::ClaimIntersects {
                    x: claim_x,
                    y: claim_y,
                    dimension,
                });
            }
        }

        let claim = ClaimStore::insert_with(&mut *tx, user_id, claim_x, claim_y, dimension).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            "user {} claimed ({}, {}) in {}",
            user_id, claim_x, claim_y, dimension
        );
        Ok(claim)
    }

    /// Removes the claim at exactly `(claim_x, claim_y)` in `dimension`.
    ///
    /// Returns whether a claim existed there; removing nothing is not an
    /// error.
    pub async fn remove_claim(
        &self,
        claim_x: i64,
        claim_y: i64,
        dimension: Dimension,
    ) -> Result<bool, BotError> {
        let removed = self.store.remove(claim_x, claim_y, dimension).await?;
        if removed {
            info!("removed claim at ({}, {}) in {}", claim_x, claim_y, dimension);
        }
        Ok(removed)
    }
}
