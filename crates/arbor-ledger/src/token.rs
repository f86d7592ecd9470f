//! TaxedToken - the ARBR token with transfer-tax routing
//!
//! Wraps the ARBR [`BalanceBook`] with tax assessment, a fee-exemption
//! set, and per-channel recipient routing. Shares whose collaborator
//! account is unset are routed per the [`UnroutedShare`] policy instead
//! of being lost; transfers never fail because of missing wiring.

use crate::book::BalanceBook;
use crate::tax::{TaxChannelKind, TaxConfig};
use arbor_core::{Address, Amount, Result};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Where a tax share goes when its collaborator account is unset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnroutedShare {
    /// Accrue to the treasury account (falls back to the recipient if the
    /// treasury account is itself unset)
    #[default]
    Treasury,
    /// Leave the share with the transfer recipient
    Recipient,
}

/// Collaborator accounts each tax channel credits.
///
/// The burn channel has no recipient: its share is retired from supply.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct TaxRecipients {
    pub liquidity: Option<Address>,
    pub treasury: Option<Address>,
    pub achievement: Option<Address>,
    pub farming: Option<Address>,
    pub referral: Option<Address>,
}

impl TaxRecipients {
    /// Configured recipient for a channel, if any
    pub fn recipient(&self, kind: TaxChannelKind) -> Option<Address> {
        match kind {
            TaxChannelKind::Liquidity => self.liquidity,
            TaxChannelKind::Burn => None,
            TaxChannelKind::Treasury => self.treasury,
            TaxChannelKind::Achievement => self.achievement,
            TaxChannelKind::Farming => self.farming,
            TaxChannelKind::Referral => self.referral,
        }
    }
}

/// One credited tax share
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutedShare {
    pub channel: TaxChannelKind,
    pub recipient: Address,
    pub amount: Amount,
}

/// Result of a (possibly taxed) transfer
#[derive(Clone, Debug, Default)]
pub struct TransferOutcome {
    pub from: Address,
    pub to: Address,
    /// Amount debited from the sender
    pub gross: Amount,
    /// Amount credited to the recipient, including any fallback shares
    pub net: Amount,
    /// Share retired from supply
    pub burned: Amount,
    /// Shares credited to collaborator accounts
    pub routed: Vec<RoutedShare>,
}

impl TransferOutcome {
    /// Total tax collected (burn plus routed shares)
    pub fn taxed(&self) -> Amount {
        self.routed
            .iter()
            .fold(self.burned, |acc, s| acc.saturating_add(s.amount))
    }

    /// Sum routed to a specific channel
    pub fn routed_to(&self, kind: TaxChannelKind) -> Amount {
        self.routed
            .iter()
            .filter(|s| s.channel == kind)
            .fold(0, |acc: Amount, s| acc.saturating_add(s.amount))
    }

    /// Referral share forwarded to the ladder pool, if any.
    ///
    /// The engine distributes this up the sponsor chain within the same
    /// operation.
    pub fn referral_share(&self) -> Amount {
        self.routed_to(TaxChannelKind::Referral)
    }
}

/// The ARBR token: balance book + transfer tax
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaxedToken {
    book: BalanceBook,
    tax: TaxConfig,
    recipients: TaxRecipients,
    unrouted: UnroutedShare,
    fee_exempt: HashSet<Address>,
}

impl TaxedToken {
    /// Create the token with the given tax wiring
    pub fn new(
        symbol: impl Into<String>,
        tax: TaxConfig,
        recipients: TaxRecipients,
        unrouted: UnroutedShare,
    ) -> Self {
        Self {
            book: BalanceBook::new(symbol),
            tax,
            recipients,
            unrouted,
            fee_exempt: HashSet::new(),
        }
    }

    /// Underlying balance book
    pub fn book(&self) -> &BalanceBook {
        &self.book
    }

    /// Mutable access for components that move the token untaxed
    /// (farm custody, license custody); those accounts are fee-exempt in
    /// the standard wiring anyway.
    pub fn book_mut(&mut self) -> &mut BalanceBook {
        &mut self.book
    }

    /// Current tax configuration
    pub fn tax(&self) -> &TaxConfig {
        &self.tax
    }

    /// Current recipient wiring
    pub fn recipients(&self) -> &TaxRecipients {
        &self.recipients
    }

    /// Balance accessor
    pub fn balance_of(&self, account: Address) -> Amount {
        self.book.balance_of(account)
    }

    /// Circulating supply
    pub fn total_supply(&self) -> Amount {
        self.book.total_supply()
    }

    /// Mint new supply. Bootstrap only; the engine gates the caller.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<()> {
        self.book.mint(to, amount)
    }

    /// Mark or unmark an account as exempt from transfer tax
    pub fn exclude_from_fee(&mut self, account: Address, excluded: bool) {
        if excluded {
            self.fee_exempt.insert(account);
        } else {
            self.fee_exempt.remove(&account);
        }
    }

    /// Whether the account bypasses transfer tax
    pub fn is_fee_exempt(&self, account: Address) -> bool {
        self.fee_exempt.contains(&account)
    }

    /// Flip the lock flags of all six channels, validating the result
    pub fn set_tax_lock_status(
        &mut self,
        liquidity: bool,
        burn: bool,
        treasury: bool,
        achievement: bool,
        farming: bool,
        referral: bool,
    ) -> Result<()> {
        let mut next = self.tax;
        next.set_lock_status(liquidity, burn, treasury, achievement, farming, referral);
        next.validate()?;
        self.tax = next;
        Ok(())
    }

    /// Update one channel's rate, validating the combined total
    pub fn set_tax_rate(&mut self, kind: TaxChannelKind, rate_bps: u16) -> Result<()> {
        let mut next = self.tax;
        next.channel_mut(kind).rate_bps = rate_bps;
        next.validate()?;
        self.tax = next;
        Ok(())
    }

    /// Rewire a channel's collaborator account
    pub fn set_recipient(&mut self, kind: TaxChannelKind, recipient: Option<Address>) {
        match kind {
            TaxChannelKind::Liquidity => self.recipients.liquidity = recipient,
            TaxChannelKind::Burn => {}
            TaxChannelKind::Treasury => self.recipients.treasury = recipient,
            TaxChannelKind::Achievement => self.recipients.achievement = recipient,
            TaxChannelKind::Farming => self.recipients.farming = recipient,
            TaxChannelKind::Referral => self.recipients.referral = recipient,
        }
    }

    /// Approve a spender on the token book
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) {
        self.book.approve(owner, spender, amount);
    }

    /// Allowance accessor
    pub fn allowance(&self, owner: Address, spender: Address) -> Amount {
        self.book.allowance(owner, spender)
    }

    /// Net amount the recipient would receive for a transfer, without
    /// executing it
    pub fn net_of_transfer(&self, from: Address, to: Address, amount: Amount) -> Amount {
        if self.is_fee_exempt(from) || self.is_fee_exempt(to) {
            return amount;
        }
        let breakdown = self.tax.assess(amount);
        let mut net = amount - breakdown.total();
        // Shares with no route fall back to the recipient.
        for kind in TaxChannelKind::ALL {
            if kind == TaxChannelKind::Burn {
                continue;
            }
            let routable = self.recipients.recipient(kind).is_some()
                || (self.unrouted == UnroutedShare::Treasury
                    && self.recipients.treasury.is_some());
            if !routable {
                net = net.saturating_add(breakdown.share(kind));
            }
        }
        net
    }

    /// Taxed transfer. Fails with `InsufficientBalance` before any state
    /// changes; afterwards the debit, burn and every credit commit
    /// together.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<TransferOutcome> {
        let available = self.book.balance_of(from);
        if available < amount {
            return Err(arbor_core::ArborError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        Ok(self.apply_transfer(from, to, amount))
    }

    /// Delegated taxed transfer within the spender's allowance
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TransferOutcome> {
        let available = self.book.balance_of(from);
        if available < amount {
            return Err(arbor_core::ArborError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        self.book.spend_allowance(from, spender, amount)?;
        Ok(self.apply_transfer(from, to, amount))
    }

    /// Commit a transfer whose balance precondition already passed
    fn apply_transfer(&mut self, from: Address, to: Address, amount: Amount) -> TransferOutcome {
        let exempt = self.is_fee_exempt(from) || self.is_fee_exempt(to);
        if exempt || self.tax.total_unlocked_bps() == 0 || amount == 0 {
            // The debit cannot fail: the balance was checked by the caller.
            let _ = self.book.debit(from, amount);
            self.book.credit(to, amount);
            return TransferOutcome {
                from,
                to,
                gross: amount,
                net: amount,
                burned: 0,
                routed: Vec::new(),
            };
        }

        let breakdown = self.tax.assess(amount);
        let _ = self.book.debit(from, amount);

        let burned = breakdown.burn;
        if burned > 0 {
            self.book.retire(burned);
        }

        let mut routed = Vec::new();
        let mut net = amount - breakdown.total();
        for kind in [
            TaxChannelKind::Liquidity,
            TaxChannelKind::Treasury,
            TaxChannelKind::Achievement,
            TaxChannelKind::Farming,
            TaxChannelKind::Referral,
        ] {
            let share = breakdown.share(kind);
            if share == 0 {
                continue;
            }
            let target = self.recipients.recipient(kind).or_else(|| match self.unrouted {
                UnroutedShare::Treasury => self.recipients.treasury,
                UnroutedShare::Recipient => None,
            });
            match target {
                Some(recipient) => {
                    self.book.credit(recipient, share);
                    routed.push(RoutedShare { channel: kind, recipient, amount: share });
                }
                None => {
                    // Unset collaborator and no treasury fallback: the
                    // share stays with the recipient, never lost.
                    tracing::warn!(
                        channel = kind.name(),
                        share,
                        "tax share unrouted, falling back to recipient"
                    );
                    net = net.saturating_add(share);
                }
            }
        }

        self.book.credit(to, net);
        tracing::debug!(
            %from,
            %to,
            gross = amount,
            net,
            burned,
            "taxed transfer"
        );

        TransferOutcome { from, to, gross: amount, net, burned, routed }
    }
}
