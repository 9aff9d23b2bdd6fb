//! The entitlement transition table.
//!
//! Both ingress paths run every signal through [`transition`]; no caller
//! branches on "already Pro" by itself.
//!
//! | current | signal status | next | effect            |
//! |---------|---------------|------|-------------------|
//! | Free    | success       | Pro  | `Upgrade`         |
//! | Pro     | success       | Pro  | `AlreadyEntitled` |
//! | Free    | other         | Free | `NoPayment`       |
//! | Pro     | other         | Pro  | `NoPayment`       |

use super::{EntitlementState, PaymentSignal};

/// What the caller must persist for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    /// Free → Pro: update the record, log the payment, keep the claim.
    Upgrade,
    /// Paid signal for a user who is already Pro: log the payment, keep the claim.
    AlreadyEntitled,
    /// No successful payment: persist nothing and release the claim.
    NoPayment,
}

/// Result of applying one signal to one entitlement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: EntitlementState,
    pub to: EntitlementState,
    pub effect: TransitionEffect,
}

impl Transition {
    pub fn changes_state(&self) -> bool {
        self.from != self.to
    }

    /// Whether the claim, payment log and outcome should be committed.
    pub fn should_commit(&self) -> bool {
        !matches!(self.effect, TransitionEffect::NoPayment)
    }
}

/// Pure, total transition function.
pub fn transition(current: EntitlementState, signal: &PaymentSignal) -> Transition {
    let (to, effect) = match (current, signal.is_success()) {
        (EntitlementState::Free, true) => (EntitlementState::Pro, TransitionEffect::Upgrade),
        (EntitlementState::Pro, true) => (EntitlementState::Pro, TransitionEffect::AlreadyEntitled),
        (state, false) => (state, TransitionEffect::NoPayment),
    };

    Transition {
        from: current,
        to,
        effect,
    }
}
