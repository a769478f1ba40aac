//! Authorization gate for governed operations.

use std::collections::HashSet;

use crate::types::AccountId;

/// Decides whether a caller may change configuration or list pairs
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, caller: AccountId) -> bool;
}

/// Fixed set of authorized accounts
#[derive(Debug, Clone, Default)]
pub struct Governor {
    owners: HashSet<AccountId>,
}

impl Governor {
    pub fn new(owners: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            owners: owners.into_iter().collect(),
        }
    }

    pub fn add(&mut self, owner: AccountId) {
        self.owners.insert(owner);
    }

    pub fn remove(&mut self, owner: AccountId) {
        self.owners.remove(&owner);
    }
}

impl Authorizer for Governor {
    fn is_authorized(&self, caller: AccountId) -> bool {
        self.owners.contains(&caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governor_membership() {
        let mut governor = Governor::new([1, 2]);
        assert!(governor.is_authorized(1));
        assert!(!governor.is_authorized(3));
        governor.add(3);
        governor.remove(1);
        assert!(governor.is_authorized(3));
        assert!(!governor.is_authorized(1));
    }
}
