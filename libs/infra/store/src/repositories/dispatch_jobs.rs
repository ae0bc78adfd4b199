// [libs/infra/store/src/repositories/dispatch_jobs.rs]
/*!
 * Dispatch job queue repository, the Workload Ledger's outbound
 * counterpart. The Dispatch
 * Worker claims jobs strictly by lane then `next_attempt_at`; the
 * claim itself is a conditional `queued -> in_flight` update so two
 * worker instances can drain the same table without double-sending.
 */

use aegis_domain_models::{DispatchJob, DispatchJobState, PriorityLane};
use chrono::{DateTime, Utc};
use libsql::{params, Connection, Row};
use serde_json::Value;

use crate::errors::StoreError;
use crate::time::{format_timestamp, parse_timestamp};

const SELECT_COLUMNS: &str =
    "id, incident_client_id, idempotency_key, payload_json, lane, attempt_count, next_attempt_at, state, last_error, created_at, updated_at";

#[derive(Clone, Default)]
pub struct DispatchJobRepository;

impl DispatchJobRepository {
    pub fn new() -> Self {
        Self
    }

    /// Idempotent on `idempotency_key`: a retried enqueue collapses
    /// into a no-op rather than a duplicate row.
    pub async fn enqueue(&self, connection: &Connection, job: &DispatchJob) -> Result<bool, StoreError> {
        let payload_json = job.payload.to_string();
        let affected = connection
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO dispatch_jobs ({SELECT_COLUMNS}) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)"
                ),
                params![
                    job.id.clone(),
                    job.incident_client_id.clone(),
                    job.idempotency_key.clone(),
                    payload_json,
                    job.lane.as_str(),
                    job.attempt_count as i64,
                    format_timestamp(job.next_attempt_at),
                    job.state.as_str(),
                    job.last_error.clone(),
                    format_timestamp(job.created_at),
                    format_timestamp(job.updated_at),
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        Ok(affected > 0)
    }

    /// Claims the single highest-priority eligible job: lowest lane
    /// value first (`P0` sorts before `P1`), then oldest
    /// `next_attempt_at`, among rows still `queued` whose backoff has
    /// elapsed.
    pub async fn claim_next(&self, connection: &Connection, now: DateTime<Utc>) -> Result<Option<DispatchJob>, StoreError> {
        let mut rows = connection
            .query(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM dispatch_jobs WHERE state = 'queued' AND next_attempt_at <= ?1 ORDER BY lane ASC, next_attempt_at ASC LIMIT 1"
                ),
                params![format_timestamp(now)],
            )
            .await
            .map_err(StoreError::Query)?;

        let Some(row) = rows.next().await.map_err(StoreError::Query)? else {
            return Ok(None);
        };
        let candidate = map_row(&row)?;

        let affected = connection
            .execute(
                "UPDATE dispatch_jobs SET state = 'in_flight', updated_at = ?2 WHERE id = ?1 AND state = 'queued'",
                params![candidate.id.clone(), format_timestamp(now)],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            // Lost the race to another worker; caller should poll again.
            return Ok(None);
        }

        Ok(Some(DispatchJob { state: DispatchJobState::InFlight, ..candidate }))
    }

    /// Fairness-ticket variant of `claim_next`: ignores lane
    /// ordering entirely and claims whichever queued job has waited
    /// longest, so a steady stream of `p0` traffic can't starve a
    /// `p3` job forever.
    pub async fn claim_oldest(&self, connection: &Connection, now: DateTime<Utc>) -> Result<Option<DispatchJob>, StoreError> {
        let mut rows = connection
            .query(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM dispatch_jobs WHERE state = 'queued' AND next_attempt_at <= ?1 ORDER BY next_attempt_at ASC LIMIT 1"
                ),
                params![format_timestamp(now)],
            )
            .await
            .map_err(StoreError::Query)?;

        let Some(row) = rows.next().await.map_err(StoreError::Query)? else {
            return Ok(None);
        };
        let candidate = map_row(&row)?;

        let affected = connection
            .execute(
                "UPDATE dispatch_jobs SET state = 'in_flight', updated_at = ?2 WHERE id = ?1 AND state = 'queued'",
                params![candidate.id.clone(), format_timestamp(now)],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Ok(None);
        }

        Ok(Some(DispatchJob { state: DispatchJobState::InFlight, ..candidate }))
    }

    pub async fn mark_delivered(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE dispatch_jobs SET state = 'delivered', updated_at = ?2 WHERE id = ?1 AND state = 'in_flight'",
                params![id.to_string(), format_timestamp(Utc::now())],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!("dispatch job {id} is not in flight")));
        }
        Ok(())
    }

    /// Reschedules a failed attempt with the caller-computed backoff
    /// delay, or parks it `FailedTerminal` once retries are exhausted.
    pub async fn reschedule_or_fail(
        &self,
        connection: &Connection,
        id: &str,
        next_attempt_at: DateTime<Utc>,
        terminal: bool,
        error: &str,
    ) -> Result<(), StoreError> {
        let next_state = if terminal { "failed_terminal" } else { "queued" };
        let affected = connection
            .execute(
                "UPDATE dispatch_jobs SET state = ?2, attempt_count = attempt_count + 1, next_attempt_at = ?3, last_error = ?4, updated_at = ?5 WHERE id = ?1 AND state = 'in_flight'",
                params![
                    id.to_string(),
                    next_state,
                    format_timestamp(next_attempt_at),
                    error.to_string(),
                    format_timestamp(Utc::now()),
                ],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!("dispatch job {id} is not in flight")));
        }
        Ok(())
    }

    /// Manual retry endpoint: re-queues a `FailedTerminal` job
    /// immediately, resetting its attempt counter.
    pub async fn retry_now(&self, connection: &Connection, id: &str) -> Result<(), StoreError> {
        let affected = connection
            .execute(
                "UPDATE dispatch_jobs SET state = 'queued', attempt_count = 0, next_attempt_at = ?2, last_error = NULL, updated_at = ?2 WHERE id = ?1 AND state = 'failed_terminal'",
                params![id.to_string(), format_timestamp(Utc::now())],
            )
            .await
            .map_err(StoreError::Query)?;

        if affected == 0 {
            return Err(StoreError::Conflict(format!("dispatch job {id} is not failed_terminal")));
        }
        Ok(())
    }

    /// Used by the ingestion pipeline's idempotent-enqueue stage: on
    /// a unique-constraint collision this looks the
    /// existing row back up so the caller can return its id instead
    /// of treating the retry as a new submission.
    pub async fn find_by_idempotency_key(&self, connection: &Connection, idempotency_key: &str) -> Result<Option<DispatchJob>, StoreError> {
        let mut rows = connection
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM dispatch_jobs WHERE idempotency_key = ?1"),
                params![idempotency_key.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;
        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Status lookup for `GET /mobile/incidents/{client_id}`: the
    /// most recent job for this client-supplied ticket id, since a
    /// resubmission with a fresh idempotency key can create more than
    /// one row against the same client id.
    pub async fn find_by_incident_client_id(
        &self,
        connection: &Connection,
        incident_client_id: &str,
    ) -> Result<Option<DispatchJob>, StoreError> {
        let mut rows = connection
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM dispatch_jobs WHERE incident_client_id = ?1 ORDER BY created_at DESC LIMIT 1"),
                params![incident_client_id.to_string()],
            )
            .await
            .map_err(StoreError::Query)?;
        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_id(&self, connection: &Connection, id: &str) -> Result<Option<DispatchJob>, StoreError> {
        let mut rows = connection
            .query(&format!("SELECT {SELECT_COLUMNS} FROM dispatch_jobs WHERE id = ?1"), params![id.to_string()])
            .await
            .map_err(StoreError::Query)?;
        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => Ok(Some(map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_by_state(&self, connection: &Connection, state: DispatchJobState, limit: i64) -> Result<Vec<DispatchJob>, StoreError> {
        let mut rows = connection
            .query(
                &format!("SELECT {SELECT_COLUMNS} FROM dispatch_jobs WHERE state = ?1 ORDER BY created_at ASC LIMIT ?2"),
                params![state.as_str(), limit],
            )
            .await
            .map_err(StoreError::Query)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(StoreError::Query)? {
            out.push(map_row(&row)?);
        }
        Ok(out)
    }
}

fn parse_lane(raw: &str) -> Result<PriorityLane, StoreError> {
    match raw {
        "p0" => Ok(PriorityLane::P0),
        "p1" => Ok(PriorityLane::P1),
        "p2" => Ok(PriorityLane::P2),
        "p3" => Ok(PriorityLane::P3),
        other => Err(StoreError::Mapping(format!("unknown lane '{other}'"))),
    }
}

fn map_row(row: &Row) -> Result<DispatchJob, StoreError> {
    let lane_raw: String = row.get(4).map_err(StoreError::Query)?;
    let state_raw: String = row.get(7).map_err(StoreError::Query)?;
    let payload_json: String = row.get(3).map_err(StoreError::Query)?;
    let payload: Value = serde_json::from_str(&payload_json).map_err(|e| StoreError::Mapping(e.to_string()))?;
    let next_attempt_raw: String = row.get(6).map_err(StoreError::Query)?;
    let created_at_raw: String = row.get(9).map_err(StoreError::Query)?;
    let updated_at_raw: String = row.get(10).map_err(StoreError::Query)?;

    Ok(DispatchJob {
        id: row.get(0).map_err(StoreError::Query)?,
        incident_client_id: row.get(1).map_err(StoreError::Query)?,
        idempotency_key: row.get(2).map_err(StoreError::Query)?,
        payload,
        lane: parse_lane(&lane_raw)?,
        attempt_count: row.get::<i64>(5).map_err(StoreError::Query)? as u32,
        next_attempt_at: parse_timestamp(&next_attempt_raw)?,
        state: DispatchJobState::parse(&state_raw)
            .ok_or_else(|| StoreError::Mapping(format!("unknown dispatch state '{state_raw}'")))?,
        last_error: row.get(8).map_err(StoreError::Query)?,
        created_at: parse_timestamp(&created_at_raw)?,
        updated_at: parse_timestamp(&updated_at_raw)?,
    })
}
