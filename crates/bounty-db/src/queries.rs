use bounty_types::{Bounty, NewBounty, NewSubmission, Submission};
use rusqlite::{Connection, Row, params};
use rusqlite::ffi::{
    SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE,
};
use tracing::debug;

use crate::models::{BountyRow, SubmissionRow};
use crate::{BountyStore, Database, DbError};

const BOUNTY_COLUMNS: &str = "id, creator, title, description, amount, status, created_at";
const SUBMISSION_COLUMNS: &str = "id, bounty_id, hunter, is_complete, created_at";

impl BountyStore for Database {
    // -- Bounties --

    fn create_bounty(&self, bounty: &NewBounty) -> Result<Bounty, DbError> {
        let row = self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO bounties (id, creator, title, description, amount)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING {BOUNTY_COLUMNS}"
                ),
                params![
                    bounty.id,
                    bounty.creator,
                    bounty.title,
                    bounty.description,
                    bounty.amount
                ],
                bounty_row,
            )
            .map_err(|e| match constraint_kind(&e) {
                Some(Constraint::Unique) => DbError::Duplicate(bounty.id.clone()),
                _ => e.into(),
            })
        })?;

        debug!("Inserted bounty {}", row.id);
        Ok(row.into())
    }

    fn complete_bounty(&self, bounty_id: &str, submission_id: i64) -> Result<(), DbError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let bounties = tx.execute(
                "UPDATE bounties SET status = 'complete' WHERE id = ?1",
                [bounty_id],
            )?;
            let submissions = tx.execute(
                "UPDATE submissions SET is_complete = 1 WHERE bounty_id = ?1 AND id = ?2",
                params![bounty_id, submission_id],
            )?;

            // Dropping the transaction uncommitted rolls both updates back.
            if bounties == 0 || submissions == 0 {
                return Err(DbError::NotFound);
            }

            tx.commit()?;
            Ok(())
        })
    }

    fn list_bounties(&self) -> Result<Vec<Bounty>, DbError> {
        let rows = self.with_conn(query_bounties)?;
        Ok(rows.into_iter().map(Bounty::from).collect())
    }

    // -- Submissions --

    fn submissions_for_bounty(&self, bounty_id: &str) -> Result<Vec<Submission>, DbError> {
        let rows = self.with_conn(|conn| query_submissions(conn, bounty_id))?;
        Ok(rows.into_iter().map(Submission::from).collect())
    }

    fn create_submission(
        &self,
        bounty_id: &str,
        submission: &NewSubmission,
    ) -> Result<Submission, DbError> {
        let row = self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "INSERT INTO submissions (id, bounty_id, hunter)
                     VALUES (?1, ?2, ?3)
                     RETURNING {SUBMISSION_COLUMNS}"
                ),
                params![submission.id, bounty_id, submission.hunter],
                submission_row,
            )
            .map_err(|e| match constraint_kind(&e) {
                Some(Constraint::Unique) => {
                    DbError::Duplicate(format!("{}/{}", bounty_id, submission.id))
                }
                Some(Constraint::ForeignKey) => DbError::NotFound,
                None => e.into(),
            })
        })?;

        Ok(row.into())
    }
}

fn query_bounties(conn: &Connection) -> Result<Vec<BountyRow>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOUNTY_COLUMNS} FROM bounties ORDER BY created_at, id"
    ))?;

    let rows = stmt
        .query_map([], bounty_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_submissions(conn: &Connection, bounty_id: &str) -> Result<Vec<SubmissionRow>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE bounty_id = ?1 ORDER BY id"
    ))?;

    let rows = stmt
        .query_map([bounty_id], submission_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn bounty_row(row: &Row<'_>) -> rusqlite::Result<BountyRow> {
    Ok(BountyRow {
        id: row.get(0)?,
        creator: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn submission_row(row: &Row<'_>) -> rusqlite::Result<SubmissionRow> {
    Ok(SubmissionRow {
        id: row.get(0)?,
        bounty_id: row.get(1)?,
        hunter: row.get(2)?,
        is_complete: row.get(3)?,
        created_at: row.get(4)?,
    })
}

enum Constraint {
    Unique,
    ForeignKey,
}

fn constraint_kind(err: &rusqlite::Error) -> Option<Constraint> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => match e.extended_code {
            SQLITE_CONSTRAINT_PRIMARYKEY | SQLITE_CONSTRAINT_UNIQUE => Some(Constraint::Unique),
            SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::ForeignKey),
            _ => None,
        },
        _ => None,
    }
}
