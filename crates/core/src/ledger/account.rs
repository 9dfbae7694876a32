//! Chart-of-accounts nodes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{AccountType, NormalBalance};

/// A chart-of-accounts node.
///
/// The normal balance side is fixed by the account type at creation and
/// has no setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Account number (unique within the chart).
    pub number: String,
    /// Display name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    normal_balance: NormalBalance,
    /// Optional parent in the account tree.
    pub parent_id: Option<AccountId>,
    /// Inactive accounts reject new entries.
    pub is_active: bool,
    /// Store version for optimistic concurrency (0 = not yet stored).
    pub version: i64,
}

impl Account {
    /// Creates a new active account.
    #[must_use]
    pub fn new(
        number: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        parent_id: Option<AccountId>,
    ) -> Self {
        Self {
            id: AccountId::new(),
            number: number.into(),
            name: name.into(),
            account_type,
            normal_balance: account_type.normal_balance(),
            parent_id,
            is_active: true,
            version: 0,
        }
    }

    /// Returns the normal balance side.
    #[must_use]
    pub const fn normal_balance(&self) -> NormalBalance {
        self.normal_balance
    }

    /// Ensures the account can receive new entries.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountInactive` if the account is deactivated.
    pub fn ensure_postable(&self) -> Result<(), LedgerError> {
        if self.is_active {
            Ok(())
        } else {
            Err(LedgerError::AccountInactive(self.id))
        }
    }
}

/// Checks that giving `account_id` the parent `new_parent` keeps the tree acyclic.
///
/// `parent_of` resolves the current parent of any account.
///
/// # Errors
///
/// Returns `LedgerError::AccountHierarchyCycle` if `account_id` is `new_parent`
/// or one of its ancestors.
pub fn ensure_acyclic<F>(
    account_id: AccountId,
    new_parent: AccountId,
    parent_of: F,
) -> Result<(), LedgerError>
where
    F: Fn(AccountId) -> Option<AccountId>,
{
    let mut seen = HashSet::new();
    let mut cursor = Some(new_parent);

    while let Some(current) = cursor {
        if current == account_id || !seen.insert(current) {
            return Err(LedgerError::AccountHierarchyCycle {
                account_id,
                parent_id: new_parent,
            });
        }
        cursor = parent_of(current);
    }

    Ok(())
}
