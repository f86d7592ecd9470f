//! Sponsor tree - arena of validated back-references
//!
//! Each registered account points at exactly one sponsor that existed
//! before it. Links never change after registration, which rules out
//! cycles without any traversal-time checks.

use arbor_core::{Address, ArborError, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// One sponsor edge plus the account's referral-earning depth
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SponsorLink {
    /// The account that referred this one
    pub sponsor: Address,
    /// Deepest ancestor level this account may collect shares at;
    /// zero until a license grants it
    pub earn_levels: u8,
    /// Ledger time of registration
    pub registered_at: u64,
}

/// The sponsor arena, rooted at a designated account
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SponsorTree {
    root: Address,
    links: HashMap<Address, SponsorLink>,
}

impl SponsorTree {
    /// Create a tree with the given root (the protocol account new
    /// members may always name as sponsor)
    pub fn new(root: Address) -> Self {
        Self {
            root,
            links: HashMap::new(),
        }
    }

    /// The designated root
    pub fn root(&self) -> Address {
        self.root
    }

    /// Number of registered accounts (root excluded)
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no account has registered yet
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Whether an account is part of the tree
    pub fn is_registered(&self, account: Address) -> bool {
        account == self.root || self.links.contains_key(&account)
    }

    /// Register an account under a sponsor.
    ///
    /// The sponsor must already be registered (or be the root); the
    /// account must be new. Links are immutable afterwards.
    pub fn register(&mut self, account: Address, sponsor: Address, now: u64) -> Result<()> {
        if account == sponsor || account == self.root {
            return Err(ArborError::InvalidSponsor(sponsor));
        }
        if self.links.contains_key(&account) {
            return Err(ArborError::AlreadyRegistered(account));
        }
        if !self.is_registered(sponsor) {
            return Err(ArborError::InvalidSponsor(sponsor));
        }
        self.links.insert(
            account,
            SponsorLink {
                sponsor,
                earn_levels: 0,
                registered_at: now,
            },
        );
        tracing::debug!(%account, %sponsor, "sponsor edge recorded");
        Ok(())
    }

    /// Direct sponsor of an account
    pub fn sponsor_of(&self, account: Address) -> Option<Address> {
        self.links.get(&account).map(|l| l.sponsor)
    }

    /// Earning depth of an account (root and unregistered accounts: 0)
    pub fn earn_levels(&self, account: Address) -> u8 {
        self.links.get(&account).map(|l| l.earn_levels).unwrap_or(0)
    }

    /// Grant or revoke earning depth; invoked by the license manager on
    /// activation and liquidation
    pub fn set_earn_levels(&mut self, account: Address, depth: u8) -> Result<()> {
        let link = self
            .links
            .get_mut(&account)
            .ok_or(ArborError::NotRegistered(account))?;
        link.earn_levels = depth;
        Ok(())
    }

    /// Walk the sponsor chain upward from an account.
    ///
    /// Yields the direct sponsor first and stops after the root. An
    /// unregistered origin yields nothing.
    pub fn ancestors(&self, account: Address) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.sponsor_of(account),
        }
    }
}

/// Iterator over an account's sponsor chain
pub struct Ancestors<'a> {
    tree: &'a SponsorTree,
    current: Option<Address>,
}

impl Iterator for Ancestors<'_> {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        let account = self.current?;
        self.current = if account == self.tree.root {
            None
        } else {
            self.tree.sponsor_of(account)
        };
        Some(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        Address::from_tag(tag)
    }

    fn chain() -> SponsorTree {
        // root <- 1 <- 2 <- 3
        let mut tree = SponsorTree::new(addr(0xFF));
        tree.register(addr(1), addr(0xFF), 0).unwrap();
        tree.register(addr(2), addr(1), 0).unwrap();
        tree.register(addr(3), addr(2), 0).unwrap();
        tree
    }

    #[test]
    fn test_register_requires_existing_sponsor() {
        let mut tree = SponsorTree::new(addr(0xFF));
        let err = tree.register(addr(2), addr(1), 0).unwrap_err();
        assert!(matches!(err, ArborError::InvalidSponsor(_)));

        tree.register(addr(1), addr(0xFF), 0).unwrap();
        tree.register(addr(2), addr(1), 0).unwrap();
        assert!(tree.is_registered(addr(2)));
    }

    #[test]
    fn test_double_registration_rejected() {
        let mut tree = chain();
        let err = tree.register(addr(2), addr(0xFF), 0).unwrap_err();
        assert!(matches!(err, ArborError::AlreadyRegistered(_)));
    }

    #[test]
    fn test_self_sponsorship_rejected() {
        let mut tree = SponsorTree::new(addr(0xFF));
        let err = tree.register(addr(1), addr(1), 0).unwrap_err();
        assert!(matches!(err, ArborError::InvalidSponsor(_)));
    }

    #[test]
    fn test_ancestor_walk_stops_at_root() {
        let tree = chain();
        let walked: Vec<Address> = tree.ancestors(addr(3)).collect();
        assert_eq!(walked, vec![addr(2), addr(1), addr(0xFF)]);

        // Unregistered origin has no chain
        assert_eq!(tree.ancestors(addr(9)).count(), 0);
    }

    #[test]
    fn test_earn_levels_default_zero() {
        let mut tree = chain();
        assert_eq!(tree.earn_levels(addr(2)), 0);
        tree.set_earn_levels(addr(2), 5).unwrap();
        assert_eq!(tree.earn_levels(addr(2)), 5);

        let err = tree.set_earn_levels(addr(9), 3).unwrap_err();
        assert!(matches!(err, ArborError::NotRegistered(_)));
    }
}
