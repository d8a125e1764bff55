//! Database row types. These map directly to SQLite rows and are converted
//! into the bounty-types models at the query boundary.

use bounty_types::{Bounty, BountyStatus, Submission};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

pub struct BountyRow {
    pub id: String,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub amount: f64,
    pub status: String,
    pub created_at: String,
}

pub struct SubmissionRow {
    pub id: i64,
    pub bounty_id: String,
    pub hunter: String,
    pub is_complete: bool,
    pub created_at: String,
}

impl From<BountyRow> for Bounty {
    fn from(row: BountyRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            warn!("Corrupt status on bounty '{}': {}", row.id, e);
            BountyStatus::Open
        });
        let created_at = parse_timestamp(&row.created_at, &row.id);

        Bounty {
            id: row.id,
            creator: row.creator,
            title: row.title,
            description: row.description,
            amount: row.amount,
            status,
            created_at,
        }
    }
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        let created_at = parse_timestamp(&row.created_at, &row.bounty_id);

        Submission {
            id: row.id,
            bounty_id: row.bounty_id,
            hunter: row.hunter,
            is_complete: row.is_complete,
            created_at,
        }
    }
}

/// SQLite stores `datetime('now')` as "YYYY-MM-DD HH:MM:SS" without timezone.
fn parse_timestamp(raw: &str, owner: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on '{}': {}", raw, owner, e);
            DateTime::default()
        })
}
