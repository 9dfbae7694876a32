//! Engine policy settings.

use tally_shared::config::EngineConfig;

/// Policy values the repositories consult at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Date window (in days, either side) for bank-to-ledger matching.
    pub reconciliation_date_tolerance_days: i64,
    /// Payment terms used when a terms string cannot be parsed.
    pub default_payment_terms_days: i64,
    /// Zero padding applied to generated document numbers.
    pub document_number_width: usize,
}

impl From<&EngineConfig> for EngineSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            reconciliation_date_tolerance_days: config.reconciliation_date_tolerance_days,
            default_payment_terms_days: config.default_payment_terms_days,
            document_number_width: config.document_number_width,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}
