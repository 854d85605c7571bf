//! # Transition Validator
//!
//! Structural legality of a proposed status transition, judged against the
//! catalog and the package's own history. This layer knows nothing about
//! business rules — it answers only whether the move is shaped correctly:
//!
//! - terminal packages accept no transition except the no-op re-confirmation;
//! - terminal statuses are *entered* only through their privileged flow
//!   (delivery happens via code redemption, which bypasses this validator
//!   and carries its own stricter checks);
//! - backward movement is legal but unusual, so it warns;
//! - re-entering a previously held status warns unless the target is
//!   terminal (terminal states are re-confirmed without penalty).
//!
//! An administrative override-role set exists as an extension point for
//! unlocking terminal packages and for direct terminal entry; it is empty
//! by default and no default configuration populates it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wharf_core::ActorRole;

use crate::history::StatusHistoryEntry;
use crate::status::PackageStatus;

/// A blocking structural defect in a proposed transition.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionError {
    /// The package is in a terminal status and the proposal is not a no-op.
    #[error("package is terminal in {current}; cannot move to {proposed}")]
    TerminalStateViolation {
        /// The terminal status the package holds.
        current: PackageStatus,
        /// The rejected target.
        proposed: PackageStatus,
    },

    /// The target is terminal and may only be entered through its
    /// privileged flow (code redemption for `Delivered`).
    #[error("{proposed} is entered through delivery-code redemption, not a direct transition")]
    TerminalEntryRestricted {
        /// The rejected terminal target.
        proposed: PackageStatus,
    },
}

/// A non-blocking observation about a proposed transition.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionWarning {
    /// The target sits earlier in the catalog than the current status
    /// (legitimate for returns, but unusual).
    #[error("transition moves backward from {from} to {to}")]
    StatusRegression {
        /// Current status.
        from: PackageStatus,
        /// Proposed earlier status.
        to: PackageStatus,
    },

    /// The target status already appears in the package's history.
    #[error("package has already been in {status}")]
    RepeatedStatus {
        /// The re-entered status.
        status: PackageStatus,
    },
}

/// Outcome of structural validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionCheck {
    /// Blocking defects; any entry rejects the transition.
    pub errors: Vec<TransitionError>,
    /// Non-blocking observations; the transition still proceeds.
    pub warnings: Vec<TransitionWarning>,
    /// The proposal re-confirms a terminal status. Accepted, but the
    /// caller must not write a history entry — the state did not change.
    pub terminal_noop: bool,
}

impl TransitionCheck {
    /// Whether the transition may proceed.
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates the structural legality of status transitions.
#[derive(Debug, Clone, Default)]
pub struct TransitionValidator {
    /// Roles permitted to move a package out of a terminal status.
    /// Empty by default.
    override_roles: HashSet<ActorRole>,
}

impl TransitionValidator {
    /// A validator with no override roles.
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator whose listed roles may unlock terminal packages.
    pub fn with_override_roles(roles: impl IntoIterator<Item = ActorRole>) -> Self {
        Self {
            override_roles: roles.into_iter().collect(),
        }
    }

    /// Judge a proposed transition.
    ///
    /// `history` is the package's full status timeline, oldest-first; it
    /// feeds only the repeated-status warning, so passing an empty slice
    /// degrades to order-based checks alone.
    pub fn validate(
        &self,
        current: PackageStatus,
        target: PackageStatus,
        actor: ActorRole,
        history: &[StatusHistoryEntry],
    ) -> TransitionCheck {
        let mut check = TransitionCheck {
            errors: Vec::new(),
            warnings: Vec::new(),
            terminal_noop: false,
        };

        if current.is_terminal() {
            if target == current {
                check.terminal_noop = true;
                return check;
            }
            if !self.override_roles.contains(&actor) {
                check.errors.push(TransitionError::TerminalStateViolation {
                    current,
                    proposed: target,
                });
                return check;
            }
            // Override path falls through to the advisory checks below.
        }

        if target.is_terminal() && !self.override_roles.contains(&actor) {
            check.errors.push(TransitionError::TerminalEntryRestricted {
                proposed: target,
            });
            return check;
        }

        if target.order_index() < current.order_index() {
            check.warnings.push(TransitionWarning::StatusRegression {
                from: current,
                to: target,
            });
        }

        let previously_held = history.iter().any(|entry| entry.status == target);
        if previously_held && !target.is_terminal() {
            check
                .warnings
                .push(TransitionWarning::RepeatedStatus { status: target });
        }

        check
    }
}
