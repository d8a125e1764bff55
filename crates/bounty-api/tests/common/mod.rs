#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use bounty_api::{AppStateInner, Orchestrator, router};
use bounty_backup::{BackupError, BackupStore, KvStore};
use bounty_chain::contract::{BountyEvent, BountyPaid, EmittedEvent};
use bounty_chain::{Address, BountyInfo, ChainError, ChainReader, H256, I256, U256};
use bounty_db::{BountyStore, Database, DbError};
use bounty_types::{Bounty, CompleteBounty, NewBounty, NewSubmission, Submission};

pub const CREATOR: &str = "0x1111111111111111111111111111111111111111";
pub const HUNTER: &str = "0x2222222222222222222222222222222222222222";

pub fn tx_hash() -> String {
    format!("0x{}", "ab".repeat(32))
}

/// The bounty contract every harness is configured with.
pub fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

pub fn valid_info() -> BountyInfo {
    BountyInfo {
        creator: Address::repeat_byte(0x11),
        reward: U256::from(1_000),
        submissions: U256::zero(),
        balance: I256::from(1_000i64),
    }
}

/// A `BountyPaid` log for `bounty` as emitted by `emitter`.
pub fn payment(emitter: Address, bounty: Address) -> EmittedEvent {
    EmittedEvent {
        emitter,
        event: BountyEvent::Paid(BountyPaid {
            bounty,
            hunter: Address::repeat_byte(0x22),
            submission_id: U256::one(),
            amount: U256::from(1_000),
        }),
    }
}

// -- Chain --

/// Answers from canned values. `None` makes the corresponding read fail.
pub struct FakeChain {
    pub info: Mutex<Option<BountyInfo>>,
    pub payment: Mutex<Option<Option<EmittedEvent>>>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            info: Mutex::new(Some(valid_info())),
            payment: Mutex::new(Some(Some(payment(contract(), Address::repeat_byte(0x33))))),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn down() -> ChainError {
        ChainError::InvalidResponse("node unavailable".into())
    }
}

#[async_trait]
impl ChainReader for FakeChain {
    async fn bounty_info(&self, _contract: &Address, _bounty_id: &str) -> Result<BountyInfo, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.info.lock().unwrap().ok_or_else(Self::down)
    }

    async fn payment_event(&self, _hash: H256) -> Result<Option<EmittedEvent>, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.payment.lock().unwrap().clone().ok_or_else(Self::down)
    }
}

// -- Primary store --

/// A real database whose writes can be switched off or slowed down.
pub struct FlakyStore {
    pub inner: Database,
    pub fail_writes: AtomicBool,
    pub write_delay_ms: AtomicU64,
    pub writes: AtomicUsize,
}

impl FlakyStore {
    fn offline() -> DbError {
        DbError::Unavailable("primary store offline".into())
    }

    /// Count the write, stall if asked to, then fail if switched off.
    fn begin_write(&self) -> Result<(), DbError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let delay = self.write_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        Ok(())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl BountyStore for FlakyStore {
    fn create_bounty(&self, bounty: &NewBounty) -> Result<Bounty, DbError> {
        self.begin_write()?;
        self.inner.create_bounty(bounty)
    }

    fn complete_bounty(&self, bounty_id: &str, submission_id: i64) -> Result<(), DbError> {
        self.begin_write()?;
        self.inner.complete_bounty(bounty_id, submission_id)
    }

    fn list_bounties(&self) -> Result<Vec<Bounty>, DbError> {
        self.inner.list_bounties()
    }

    fn submissions_for_bounty(&self, bounty_id: &str) -> Result<Vec<Submission>, DbError> {
        self.inner.submissions_for_bounty(bounty_id)
    }

    fn create_submission(&self, bounty_id: &str, submission: &NewSubmission) -> Result<Submission, DbError> {
        self.inner.create_submission(bounty_id, submission)
    }
}

// -- Backup store --

pub struct FlakyBackup {
    pub inner: KvStore,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
}

impl FlakyBackup {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BackupStore for FlakyBackup {
    fn backup_create(&self, bounty: &NewBounty) -> Result<(), BackupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackupError::Unavailable("backup store offline".into()));
        }
        self.inner.backup_create(bounty)
    }

    fn backup_complete(&self, completion: &CompleteBounty) -> Result<(), BackupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(BackupError::Unavailable("backup store offline".into()));
        }
        self.inner.backup_complete(completion)
    }
}

// -- Harness --

pub struct Harness {
    _dir: TempDir,
    pub chain: Arc<FakeChain>,
    pub store: Arc<FlakyStore>,
    pub backup: Arc<FlakyBackup>,
    pub app: Router,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_chain(FakeChain::new(), Duration::from_secs(5))
    }

    pub fn with_chain(chain: FakeChain, io_timeout: Duration) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(chain);
        let store = Arc::new(FlakyStore {
            inner: Database::open(&dir.path().join("bounty.db")).unwrap(),
            fail_writes: AtomicBool::new(false),
            write_delay_ms: AtomicU64::new(0),
            writes: AtomicUsize::new(0),
        });
        let backup = Arc::new(FlakyBackup {
            inner: KvStore::open(&dir.path().join("backup.db")).unwrap(),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        });

        let orchestrator = Orchestrator::new(
            chain.clone(),
            store.clone(),
            backup.clone(),
            contract(),
            io_timeout,
        );
        let app = router(Arc::new(AppStateInner {
            store: store.clone(),
            orchestrator,
            io_timeout,
        }));

        Self {
            _dir: dir,
            chain,
            store,
            backup,
            app,
        }
    }

    pub fn fail_primary(&self) {
        self.store.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Make every primary write stall for `delay` before doing anything.
    pub fn slow_primary(&self, delay: Duration) {
        let ms = u64::try_from(delay.as_millis()).unwrap();
        self.store.write_delay_ms.store(ms, Ordering::SeqCst);
    }

    pub fn fail_backup(&self) {
        self.backup.fail.store(true, Ordering::SeqCst);
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Body::empty()).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Body::from(body.to_string())).await
    }

    pub async fn post_raw(&self, uri: &str, body: &'static str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Body::from(body)).await
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn create(&self, id: &str) -> (StatusCode, Value) {
        self.post("/bounties", bounty_body(id)).await
    }

    pub async fn complete(&self, id: &str, submission_id: i64) -> (StatusCode, Value) {
        self.post(
            "/bounties/complete",
            json!({ "hash": tx_hash(), "bountyId": id, "submissionId": submission_id }),
        )
        .await
    }
}

pub fn bounty_body(id: &str) -> Value {
    json!({
        "id": id,
        "creator": CREATOR,
        "title": "Fix the parser",
        "description": "Handle nested arrays",
        "amount": 250
    })
}
