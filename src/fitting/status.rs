//! Fit state machine.
//!
//! States only change inside `finalize`; accessors are meaningful after
//! `Stable` and implementation-defined otherwise.

// ============================================================================
// Fit Result
// ============================================================================

/// Outcome of a fitting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitResult {
    /// The fit has not been finalized since its last `init`.
    #[default]
    Undefined,

    /// The fit converged; accessors are valid.
    Stable,

    /// The neighborhood was degenerate (zero weight mass or rank
    /// deficiency); the fit must be re-initialized.
    Unstable,

    /// The fit needs another complete pass over the neighborhood before
    /// the next `finalize`.
    NeedOtherPass,

    /// Two pipeline stages tried to provide the same primitive.
    ConflictErrorFound,

    /// The input lacks an attribute the fit requires (e.g. per-point
    /// normals).
    NotSupported,
}

impl FitResult {
    /// Whether the state is terminal (no further pass expected).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FitResult::NeedOtherPass)
    }

    /// Whether accessors are valid.
    #[inline]
    pub fn is_stable(&self) -> bool {
        matches!(self, FitResult::Stable)
    }
}
