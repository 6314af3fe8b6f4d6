/*
[INPUT]:  Dashboard wire schema and session lifecycle
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - enum definitions
[UPDATE]: When wallet roles or session states change
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a wallet plays in the token operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletGroup {
    Dev,
    Fund,
    Group1,
    Group2,
    Archive,
}

/// Lifecycle of one feed session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    Open,
    Closed,
}

impl SessionStatus {
    pub fn is_open(self) -> bool {
        matches!(self, SessionStatus::Open)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionStatus::Connecting => "connecting",
            SessionStatus::Open => "open",
            SessionStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}
