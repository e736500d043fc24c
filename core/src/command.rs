use serde::{Deserialize, Serialize};

/// Commands a front end can send to the ledger runner.
/// Mirrors the form's buttons plus the maintenance actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum LedgerCommand {
    // ── Form actions ──────────────────────────────
    /// Raw text fields, validated the same way the form validates them.
    AddCustomer {
        name:   String,
        mobile: String,
        coffee: String,
    },
    FindCustomer {
        query: String,
    },
    AddCoffee {
        name:   String,
        amount: i64,
    },
    List,

    // ── Maintenance ───────────────────────────────
    Rollover {
        #[serde(default)]
        month: Option<String>,
    },
    Analytics,
    Export,
    Report,
    Quit,
}
