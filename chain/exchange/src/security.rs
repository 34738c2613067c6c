//! Shared security primitives for the engine
//!
//! Provides the call-in-progress guard and the role-based access control
//! consumed by the engine's governance surface.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::ids::AccountId;

/// Reentrancy guard preventing nested calls into mutating entry points.
///
/// Every mutating engine operation acquires the guard before touching
/// state and releases it on every exit path. A ledger callback that tried
/// to re-enter the engine while a call is in progress would find the
/// guard held and be rejected.
#[derive(Debug, Clone)]
pub struct ReentrancyGuard {
    locked: bool,
}

impl ReentrancyGuard {
    /// Create a new unlocked guard.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Acquire the guard. Returns `true` if successfully acquired.
    /// Returns `false` if already locked (reentrancy attempt).
    pub fn acquire(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Release the guard.
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// Check if currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Administrative roles recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Governance: rate setting, commission release, admin cancel
    Admin,
    /// Operational tasks without governance power
    Operator,
}

/// Role-based access control manager.
///
/// Maps accounts to their assigned roles. The registry component owns
/// role policy; the engine only consumes boolean answers from this map.
#[derive(Debug, Clone)]
pub struct AccessControl {
    roles: HashMap<AccountId, Role>,
    admin: AccountId,
}

impl AccessControl {
    /// Create access control with an initial admin.
    pub fn new(admin: AccountId) -> Self {
        let mut roles = HashMap::new();
        roles.insert(admin, Role::Admin);
        Self { roles, admin }
    }

    /// Check if an account has the specified role.
    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.roles.get(account).map_or(false, |r| *r == role)
    }

    /// Check if an account holds the governance role.
    pub fn is_admin(&self, account: &AccountId) -> bool {
        self.has_role(account, Role::Admin)
    }

    /// Assign a role. Only an admin can assign roles.
    pub fn grant_role(&mut self, admin_caller: &AccountId, target: AccountId, role: Role) -> bool {
        if !self.is_admin(admin_caller) {
            return false;
        }
        self.roles.insert(target, role);
        true
    }

    /// Remove a role. Only an admin can revoke; the primary admin cannot
    /// be revoked.
    pub fn revoke_role(&mut self, admin_caller: &AccountId, target: &AccountId) -> bool {
        if !self.is_admin(admin_caller) {
            return false;
        }
        if *target == self.admin {
            return false;
        }
        self.roles.remove(target);
        true
    }

    /// Transfer the primary admin role to a new account.
    pub fn transfer_admin(&mut self, current_admin: &AccountId, new_admin: AccountId) -> bool {
        if !self.is_admin(current_admin) {
            return false;
        }
        self.roles.remove(current_admin);
        self.roles.insert(new_admin, Role::Admin);
        self.admin = new_admin;
        true
    }

    /// Get the current primary admin.
    pub fn admin(&self) -> &AccountId {
        &self.admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- ReentrancyGuard tests ---

    #[test]
    fn test_reentrancy_guard_acquire_release() {
        let mut guard = ReentrancyGuard::new();
        assert!(!guard.is_locked());
        assert!(guard.acquire());
        assert!(guard.is_locked());
        guard.release();
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_reentrancy_guard_double_acquire_fails() {
        let mut guard = ReentrancyGuard::new();
        assert!(guard.acquire());
        assert!(!guard.acquire(), "Second acquire must fail");
    }

    #[test]
    fn test_reentrancy_guard_reacquire_after_release() {
        let mut guard = ReentrancyGuard::new();
        assert!(guard.acquire());
        guard.release();
        assert!(guard.acquire(), "Should succeed after release");
    }

    // --- AccessControl tests ---

    #[test]
    fn test_access_control_admin() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let ac = AccessControl::new(alice);
        assert!(ac.is_admin(&alice));
        assert!(!ac.is_admin(&bob));
    }

    #[test]
    fn test_access_control_grant_role() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let mut ac = AccessControl::new(alice);
        assert!(ac.grant_role(&alice, bob, Role::Operator));
        assert!(ac.has_role(&bob, Role::Operator));
        assert!(!ac.is_admin(&bob), "Operator role does not imply admin");
    }

    #[test]
    fn test_access_control_non_admin_cannot_grant() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let charlie = AccountId::new();
        let mut ac = AccessControl::new(alice);
        assert!(!ac.grant_role(&bob, charlie, Role::Operator));
    }

    #[test]
    fn test_access_control_revoke_role() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let mut ac = AccessControl::new(alice);
        ac.grant_role(&alice, bob, Role::Operator);
        assert!(ac.revoke_role(&alice, &bob));
        assert!(!ac.has_role(&bob, Role::Operator));
    }

    #[test]
    fn test_access_control_cannot_revoke_primary_admin() {
        let alice = AccountId::new();
        let mut ac = AccessControl::new(alice);
        assert!(!ac.revoke_role(&alice, &alice));
    }

    #[test]
    fn test_access_control_transfer_admin() {
        let alice = AccountId::new();
        let bob = AccountId::new();
        let mut ac = AccessControl::new(alice);
        assert!(ac.transfer_admin(&alice, bob));
        assert!(ac.is_admin(&bob));
        assert!(!ac.is_admin(&alice));
        assert_eq!(ac.admin(), &bob);
    }
}
