// ABOUTME: Diagnostics accumulator for non-fatal storage warnings.
// ABOUTME: Storage failures are reported here and never interrupt a registry operation.

/// Collects non-fatal warnings raised while persisting the registry.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Remove and return the collected warnings.
    pub fn take(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

/// A non-fatal warning from one of the storage adapters.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a key-value backup store warning.
    pub fn backup_store(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::BackupStore,
            message: message.into(),
        }
    }

    /// Create a structured catalog warning.
    pub fn catalog_store(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CatalogStore,
            message: message.into(),
        }
    }
}

/// Which adapter a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The whole-list key-value backup.
    BackupStore,
    /// The per-record structured catalog.
    CatalogStore,
}
