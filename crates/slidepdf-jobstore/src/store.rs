//! Job store backed by Redis.
//!
//! Layout:
//! - `{prefix}:job:{id}`: hash holding the job record fields
//! - `{prefix}:jobs:pending`: list of queued job ids
//!
//! The claim script pops the next pending id and applies the
//! `queued -> processing` transition in one atomic step; `complete` and
//! `fail` are compare-and-set scripts. A record can never skip `processing`
//! or leave a terminal state.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Script};
use tracing::{debug, info, warn};

use slidepdf_models::{Job, JobId, JobState};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Pop the next pending id and transition it `queued -> processing`, in one
/// atomic step. Returns the claimed id, `""` when the list is empty, or
/// `"!{id}"` when the popped record was not claimable.
static CLAIM_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local id = redis.call('RPOP', KEYS[1])
        if not id then
            return ''
        end
        local key = ARGV[2] .. ':job:' .. id
        local state = redis.call('HGET', key, 'state')
        if state ~= 'queued' then
            return '!' .. id
        end
        redis.call('HSET', key, 'state', 'processing', 'updated_at', ARGV[1])
        return id
        "#,
    )
});

/// Transition `processing -> done` and attach the result URL.
static COMPLETE_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local state = redis.call('HGET', KEYS[1], 'state')
        if state ~= 'processing' then
            return state or ''
        end
        redis.call('HSET', KEYS[1], 'state', 'done', 'result', ARGV[1], 'updated_at', ARGV[2])
        redis.call('HDEL', KEYS[1], 'error')
        return 'ok'
        "#,
    )
});

/// Transition `processing -> failed` and attach the error message.
static FAIL_SCRIPT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r#"
        local state = redis.call('HGET', KEYS[1], 'state')
        if state ~= 'processing' then
            return state or ''
        end
        redis.call('HSET', KEYS[1], 'state', 'failed', 'error', ARGV[1], 'updated_at', ARGV[2])
        redis.call('HDEL', KEYS[1], 'result')
        return 'ok'
        "#,
    )
});

/// Durable job store client.
pub struct JobStore {
    client: redis::Client,
    config: StoreConfig,
}

impl JobStore {
    /// Create a new job store.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(StoreConfig::from_env())
    }

    fn job_key(&self, id: &str) -> String {
        format!("{}:job:{}", self.config.key_prefix, id)
    }

    fn pending_key(&self) -> String {
        format!("{}:jobs:pending", self.config.key_prefix)
    }

    /// Create a job record and enqueue its id.
    ///
    /// The hash write and the list push run in one MULTI/EXEC transaction:
    /// a worker can never pop an id whose record does not exist yet.
    pub async fn create(&self, job: &Job) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let fields = job_to_fields(job);
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.hset_multiple(self.job_key(job.id.as_str()), &fields)
            .ignore();
        pipe.lpush(self.pending_key(), job.id.as_str()).ignore();
        pipe.query_async::<()>(&mut conn).await?;

        info!(job_id = %job.id, filename = %job.filename, "Created job");
        Ok(())
    }

    /// Fetch a job record by id.
    pub async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let map: HashMap<String, String> = conn.hgetall(self.job_key(id.as_str())).await?;
        if map.is_empty() {
            return Ok(None);
        }

        job_from_map(&map).map(Some)
    }

    /// Claim the next queued job, suspending until one is available.
    ///
    /// Polls the pending list with capped exponential backoff. Pop and the
    /// `queued -> processing` transition happen in a single script, so at
    /// most one claimant ever owns a job and a cancelled claim can never
    /// strand a half-transitioned record. Pending ids whose record is no
    /// longer `queued` are skipped with a warning.
    pub async fn claim_next(&self) -> StoreResult<Job> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let pending_key = self.pending_key();
        let mut backoff = self.config.poll_interval;

        loop {
            let outcome: String = CLAIM_SCRIPT
                .key(&pending_key)
                .arg(Utc::now().to_rfc3339())
                .arg(&self.config.key_prefix)
                .invoke_async(&mut conn)
                .await?;

            if outcome.is_empty() {
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(self.config.poll_max_interval);
                continue;
            }

            if let Some(id) = outcome.strip_prefix('!') {
                warn!(job_id = %id, "Skipping pending id that is not queued");
                continue;
            }

            let job = self
                .get(&JobId::from_string(&outcome))
                .await?
                .ok_or_else(|| StoreError::not_found(&outcome))?;

            debug!(job_id = %job.id, "Claimed job");
            return Ok(job);
        }
    }

    /// Atomically mark a `processing` job as done.
    ///
    /// Fails with [`StoreError::StateConflict`] when the job is not currently
    /// `processing`; callers log that as fatal and do not retry.
    pub async fn complete(&self, id: &JobId, url: &str) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let outcome: String = COMPLETE_SCRIPT
            .key(self.job_key(id.as_str()))
            .arg(url)
            .arg(Utc::now().to_rfc3339())
            .invoke_async(&mut conn)
            .await?;

        match outcome.as_str() {
            "ok" => {
                info!(job_id = %id, "Job completed");
                Ok(())
            }
            "" => Err(StoreError::not_found(id.as_str())),
            actual => Err(StoreError::StateConflict {
                job_id: id.to_string(),
                expected: "processing",
                actual: actual.to_string(),
            }),
        }
    }

    /// Atomically mark a `processing` job as failed.
    ///
    /// Same precondition as [`JobStore::complete`].
    pub async fn fail(&self, id: &JobId, error: &str) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let outcome: String = FAIL_SCRIPT
            .key(self.job_key(id.as_str()))
            .arg(error)
            .arg(Utc::now().to_rfc3339())
            .invoke_async(&mut conn)
            .await?;

        match outcome.as_str() {
            "ok" => {
                info!(job_id = %id, error = %error, "Job failed");
                Ok(())
            }
            "" => Err(StoreError::not_found(id.as_str())),
            actual => Err(StoreError::StateConflict {
                job_id: id.to_string(),
                expected: "processing",
                actual: actual.to_string(),
            }),
        }
    }

    /// Check connectivity to Redis.
    pub async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }

    /// Number of jobs waiting to be claimed.
    pub async fn pending_len(&self) -> StoreResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = conn.llen(self.pending_key()).await?;
        Ok(len)
    }
}

fn job_to_fields(job: &Job) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("id", job.id.as_str().to_string()),
        ("filename", job.filename.clone()),
        ("input_ref", job.input_ref.clone()),
        ("state", job.state.as_str().to_string()),
        ("created_at", job.created_at.to_rfc3339()),
        ("updated_at", job.updated_at.to_rfc3339()),
    ];
    if let Some(result) = &job.result {
        fields.push(("result", result.clone()));
    }
    if let Some(error) = &job.error {
        fields.push(("error", error.clone()));
    }
    fields
}

fn job_from_map(map: &HashMap<String, String>) -> StoreResult<Job> {
    let required = |field: &str| -> StoreResult<String> {
        map.get(field)
            .cloned()
            .ok_or_else(|| StoreError::malformed(format!("missing field '{}'", field)))
    };

    let state_raw = required("state")?;
    let state = JobState::parse(&state_raw)
        .ok_or_else(|| StoreError::malformed(format!("unknown state '{}'", state_raw)))?;

    Ok(Job {
        id: JobId::from_string(required("id")?),
        filename: required("filename")?,
        input_ref: required("input_ref")?,
        state,
        result: map.get("result").cloned(),
        error: map.get("error").cloned(),
        created_at: parse_timestamp(&required("created_at")?)?,
        updated_at: parse_timestamp(&required("updated_at")?)?,
    })
}

fn parse_timestamp(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::malformed(format!("bad timestamp '{}': {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_field_round_trip() {
        let job = Job::new("deck.pptx", "/tmp/slidepdf/abc.pptx");

        let map: HashMap<String, String> = job_to_fields(&job)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let parsed = job_from_map(&map).unwrap();
        assert_eq!(parsed, job);
    }

    #[test]
    fn test_terminal_job_round_trip() {
        let job = Job::new("deck.pptx", "/tmp/slidepdf/abc.pptx")
            .start()
            .fail("conversion daemon returned 502");

        let map: HashMap<String, String> = job_to_fields(&job)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let parsed = job_from_map(&map).unwrap();
        assert_eq!(parsed.state, JobState::Failed);
        assert_eq!(parsed.error, job.error);
        assert!(parsed.result.is_none());
    }

    #[test]
    fn test_malformed_record_rejected() {
        let mut map = HashMap::new();
        map.insert("id".to_string(), "abc".to_string());
        assert!(matches!(
            job_from_map(&map),
            Err(StoreError::Malformed(_))
        ));

        map.insert("filename".to_string(), "deck.pptx".to_string());
        map.insert("input_ref".to_string(), "/tmp/x.pptx".to_string());
        map.insert("state".to_string(), "exploded".to_string());
        map.insert("created_at".to_string(), Utc::now().to_rfc3339());
        map.insert("updated_at".to_string(), Utc::now().to_rfc3339());
        assert!(matches!(
            job_from_map(&map),
            Err(StoreError::Malformed(_))
        ));
    }
}
