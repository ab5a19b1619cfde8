pub mod sqlite3;

use serde::{Deserialize, Serialize};

/// One persisted `(scan_code, date)` aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystrokeRow {
    pub id: i64,
    pub scan_code: u32,
    pub key_name: String,
    /// `YYYY-MM-DD`, same lexical form the capture path writes.
    pub date: String,
    pub count: u64,
}
