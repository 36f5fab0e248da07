/// Why a damage notification did not start a death transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GateRejection {
    /// The stack or its representative no longer exists, or the representative
    /// is already natively dead.
    CreatureGone,
    /// Stacking is disabled for this stack and it holds a single unit.
    StackingDisabled,
    /// The hit does not kill the unit taking it; the host applies it natively.
    NotLethal,
    /// Another death transaction is in flight for this stack.
    InTransaction,
}

/// What a transaction did, for callers and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionOutcome {
    Rejected(GateRejection),
    /// A defensive item absorbed the hit.
    DefensiveItem,
    /// The victim turned into another kind instead of dying.
    Transformed,
    /// The health was applied but no unit could be removed.
    NoKill,
    /// `removed` units died; the commit is pending.
    Unstacked { removed: u32 },
}

/// Answer to the host's damage notification.
///
/// When `cancel_event` is true the engine already applied the health change and
/// the caller must suppress its own damage pipeline. `event_damage` is the
/// value the caller reports for event consistency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransactionResult {
    pub cancel_event: bool,
    pub event_damage: f64,
    pub outcome: TransactionOutcome,
}

impl TransactionResult {
    /// Neutral result: nothing was mutated, the host proceeds as usual.
    pub fn rejected(reason: GateRejection, final_damage: f64) -> Self {
        Self {
            cancel_event: false,
            event_damage: final_damage,
            outcome: TransactionOutcome::Rejected(reason),
        }
    }

    /// A defensive item handled the hit: not cancelled, no damage reported.
    pub fn defensive_item() -> Self {
        Self {
            cancel_event: false,
            event_damage: 0.0,
            outcome: TransactionOutcome::DefensiveItem,
        }
    }

    pub fn handled(final_damage: f64, outcome: TransactionOutcome) -> Self {
        Self {
            cancel_event: true,
            event_damage: final_damage,
            outcome,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.outcome, TransactionOutcome::Rejected(_))
    }

    /// Units removed by this transaction.
    pub fn removed(&self) -> u32 {
        match self.outcome {
            TransactionOutcome::Unstacked { removed } => removed,
            _ => 0,
        }
    }
}
