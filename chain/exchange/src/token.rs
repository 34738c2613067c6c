//! Fungible-asset ledgers and atomic settlement
//!
//! The engine never touches balances directly: it describes a settlement
//! as a batch of transfer legs and hands it to [`AssetBank::transact`],
//! which applies the whole batch to staged copies of the affected ledgers
//! and commits only if every leg succeeds. A failed leg therefore aborts
//! the entire settlement with no balance moved.
//!
//! Project-asset ledgers carry an [`ApprovalOracle`] handle: every
//! live-to-live transfer requires both parties to be approved. Issuance
//! paths (mint/burn) bypass the oracle.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use types::amount::Amount;
use types::ids::{AccountId, AssetId};

use crate::errors::TokenError;

/// Per-account approval state consulted by gated ledgers.
///
/// A narrow queried capability: the ledger only consumes boolean answers,
/// the registry component owns the approval policy.
pub trait ApprovalOracle: fmt::Debug + Send + Sync {
    /// Whether the account may hold and receive the asset.
    fn is_approved(&self, account: &AccountId) -> bool;
}

/// In-memory approval registry (the KYC-style flag store).
///
/// Interior mutability lets ledgers hold a shared handle while approval
/// flags change underneath them.
#[derive(Debug, Default)]
pub struct ApprovalRegistry {
    approved: RwLock<HashSet<AccountId>>,
}

impl ApprovalRegistry {
    /// Create an empty registry (no account approved).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear an account's approval flag.
    pub fn set_approved(&self, account: AccountId, approved: bool) {
        let mut set = self.approved.write().expect("approval registry poisoned");
        if approved {
            set.insert(account);
        } else {
            set.remove(&account);
        }
    }
}

impl ApprovalOracle for ApprovalRegistry {
    fn is_approved(&self, account: &AccountId) -> bool {
        self.approved
            .read()
            .expect("approval registry poisoned")
            .contains(account)
    }
}

/// An in-memory fungible-asset ledger with allowance-based delegation.
///
/// Balance arithmetic is checked everywhere; a ledger constructed with an
/// oracle rejects any live-to-live transfer whose sender or recipient is
/// unapproved.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    asset: AssetId,
    balances: HashMap<AccountId, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
    oracle: Option<Arc<dyn ApprovalOracle>>,
}

impl TokenLedger {
    /// Create an ungated ledger (e.g. the quote asset).
    pub fn new(asset: AssetId) -> Self {
        Self {
            asset,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: Amount::ZERO,
            oracle: None,
        }
    }

    /// Create a ledger gated by an approval oracle (the project asset).
    pub fn with_oracle(asset: AssetId, oracle: Arc<dyn ApprovalOracle>) -> Self {
        Self {
            oracle: Some(oracle),
            ..Self::new(asset)
        }
    }

    /// The asset this ledger tracks.
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }

    /// Balance of an account (zero if never credited).
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Total minted supply.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Remaining allowance granted by `owner` to `spender`.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    /// Grant `spender` the right to pull up to `amount` from `owner`.
    /// Setting a zero amount clears the allowance.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Issue new units to `to`. Bypasses the approval oracle.
    pub fn mint(&mut self, to: AccountId, amount: Amount) -> Result<(), TokenError> {
        if amount.is_zero() {
            return Err(TokenError::InvalidAmount);
        }
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.credit(to, amount)
    }

    /// Destroy units held by `from`. Bypasses the approval oracle.
    pub fn burn(&mut self, from: AccountId, amount: Amount) -> Result<(), TokenError> {
        if amount.is_zero() {
            return Err(TokenError::InvalidAmount);
        }
        self.debit(&from, amount)?;
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Move `amount` from `from` to `to`. Both parties must be approved
    /// when the ledger is oracle-gated.
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if amount.is_zero() {
            return Err(TokenError::InvalidAmount);
        }
        self.check_approved(&from)?;
        self.check_approved(&to)?;
        self.debit(&from, amount)?;
        self.credit(to, amount)
    }

    /// Delegated transfer: `spender` consumes its allowance from `from`
    /// and moves `amount` to `to`.
    pub fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TokenError> {
        if amount.is_zero() {
            return Err(TokenError::InvalidAmount);
        }
        let allowance = self.allowance(&from, &spender);
        let remaining = allowance
            .checked_sub(amount)
            .ok_or_else(|| TokenError::InsufficientAllowance {
                asset: self.asset.to_string(),
                required: amount.to_string(),
                available: allowance.to_string(),
            })?;
        self.check_approved(&from)?;
        self.check_approved(&to)?;
        self.debit(&from, amount)?;
        self.credit(to, amount)?;
        self.approve(from, spender, remaining);
        Ok(())
    }

    fn check_approved(&self, account: &AccountId) -> Result<(), TokenError> {
        match &self.oracle {
            Some(oracle) if !oracle.is_approved(account) => Err(TokenError::NotApproved {
                account: account.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn credit(&mut self, account: AccountId, amount: Amount) -> Result<(), TokenError> {
        let balance = self.balances.entry(account).or_insert(Amount::ZERO);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    fn debit(&mut self, account: &AccountId, amount: Amount) -> Result<(), TokenError> {
        let available = self.balance_of(account);
        let remaining =
            available
                .checked_sub(amount)
                .ok_or_else(|| TokenError::InsufficientBalance {
                    asset: self.asset.to_string(),
                    required: amount.to_string(),
                    available: available.to_string(),
                })?;
        self.balances.insert(*account, remaining);
        Ok(())
    }
}

/// One leg of a settlement batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLeg {
    pub asset: AssetId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
    /// When set, the leg consumes this spender's allowance from `from`.
    pub spender: Option<AccountId>,
}

impl TransferLeg {
    /// A transfer initiated by the owner of `from` (custody payouts).
    pub fn direct(asset: AssetId, from: AccountId, to: AccountId, amount: Amount) -> Self {
        Self {
            asset,
            from,
            to,
            amount,
            spender: None,
        }
    }

    /// An allowance-consuming transfer pulled by `spender`.
    pub fn delegated(
        asset: AssetId,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Self {
        Self {
            asset,
            from,
            to,
            amount,
            spender: Some(spender),
        }
    }
}

/// Registry of token ledgers keyed by asset, with atomic multi-leg
/// settlement.
#[derive(Debug, Default)]
pub struct AssetBank {
    ledgers: HashMap<AssetId, TokenLedger>,
}

impl AssetBank {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ledger under its asset id, replacing any previous one.
    pub fn register(&mut self, ledger: TokenLedger) {
        self.ledgers.insert(ledger.asset().clone(), ledger);
    }

    /// Look up a ledger.
    pub fn ledger(&self, asset: &AssetId) -> Result<&TokenLedger, TokenError> {
        self.ledgers
            .get(asset)
            .ok_or_else(|| TokenError::UnknownAsset {
                asset: asset.to_string(),
            })
    }

    /// Look up a ledger mutably (issuance and allowance management).
    pub fn ledger_mut(&mut self, asset: &AssetId) -> Result<&mut TokenLedger, TokenError> {
        self.ledgers
            .get_mut(asset)
            .ok_or_else(|| TokenError::UnknownAsset {
                asset: asset.to_string(),
            })
    }

    /// Execute a batch of transfer legs all-or-nothing.
    ///
    /// Legs are applied in order to staged copies of the affected ledgers;
    /// the copies replace the live ledgers only after every leg succeeds.
    pub fn transact(&mut self, legs: &[TransferLeg]) -> Result<(), TokenError> {
        let mut staged: HashMap<AssetId, TokenLedger> = HashMap::new();
        for leg in legs {
            let ledger = match staged.entry(leg.asset.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(slot) => {
                    let live =
                        self.ledgers
                            .get(&leg.asset)
                            .ok_or_else(|| TokenError::UnknownAsset {
                                asset: leg.asset.to_string(),
                            })?;
                    slot.insert(live.clone())
                }
            };
            match leg.spender {
                Some(spender) => ledger.transfer_from(spender, leg.from, leg.to, leg.amount)?,
                None => ledger.transfer(leg.from, leg.to, leg.amount)?,
            }
        }
        for (asset, ledger) in staged {
            self.ledgers.insert(asset, ledger);
        }
        Ok(())
    }
}
