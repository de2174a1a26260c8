// crates/sut-control-core/src/constraints.rs
// ============================================================================
// Module: Constraint Translation Context
// Description: Context value for schema-constraint translation.
// Purpose: Carry the table currently being processed during translation.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! Schema-constraint extraction walks table definitions one at a time and
//! threads a [`TranslationContext`] through the translators. The value is
//! immutable and owned solely by the constraint-extraction side; it has no
//! relationship to the lifecycle entities in this crate.

// ============================================================================
// SECTION: Translation Context
// ============================================================================

/// Immutable context for one constraint-translation pass.
///
/// # Invariants
/// - `current_table_name` never changes after construction; translators
///   build a new context when moving to another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationContext {
    /// Name of the table currently being processed.
    current_table_name: String,
}

impl TranslationContext {
    /// Creates a context for the given table.
    #[must_use]
    pub fn new(current_table_name: impl Into<String>) -> Self {
        Self {
            current_table_name: current_table_name.into(),
        }
    }

    /// Returns the name of the table currently being processed.
    #[must_use]
    pub fn current_table_name(&self) -> &str {
        &self.current_table_name
    }
}
