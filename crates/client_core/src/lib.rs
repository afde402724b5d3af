use std::sync::Arc;

use shared::{
    domain::{Draft, RecordId, UserRecord},
    protocol::CreateUserRequest,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod transport;

pub use error::{Operation, SyncError, TransportError};
pub use transport::{CollectionTransport, HttpTransport, TransportResponse};

/// Local view of the remote user collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    /// Contents of the last successful list response.
    pub records: Vec<UserRecord>,
    /// True only while a list request is in flight.
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl SyncState {
    pub fn find(&self, id: &RecordId) -> Option<&UserRecord> {
        self.records
            .iter()
            .find(|record| record.resolved_id().as_ref() == Some(id))
    }
}

/// Keeps a [`SyncState`] consistent with the remote collection.
///
/// Every mutation is followed by a full re-fetch; nothing is inserted or
/// removed locally. Failures leave `records` as they were and are both
/// returned to the caller and mirrored into `error_message`.
///
/// The state lives in a watch channel and is only written through it, so
/// renderers can follow it with [`SyncController::subscribe_state`] while
/// requests are in flight. Overlapping `list` calls are allowed; whichever
/// response resolves last wins, and the first one to finish clears
/// `is_loading` even though the other is still in flight.
pub struct SyncController {
    transport: Arc<dyn CollectionTransport>,
    state: watch::Sender<SyncState>,
}

impl SyncController {
    pub fn new(transport: Arc<dyn CollectionTransport>) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self { transport, state }
    }

    /// Controller over HTTP against `api_base` (e.g. `http://localhost:5000`).
    pub fn connect(api_base: &str) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(HttpTransport::new(api_base)?)))
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Replaces `records` with the remote collection; returns how many were loaded.
    pub async fn list(&self) -> Result<usize, SyncError> {
        self.clear_error();
        let _loading = LoadingGuard::start(&self.state);

        match self.fetch_records().await {
            Ok(records) => {
                let count = records.len();
                self.state.send_modify(|state| state.records = records);
                info!(count, "users: list refreshed");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "users: list failed");
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Submits `draft` and re-fetches the collection.
    ///
    /// On success the draft is reset to empty fields. A failure of the
    /// follow-up list is reported through `error_message` only, since the
    /// record itself was created.
    pub async fn create(&self, draft: &mut Draft) -> Result<(), SyncError> {
        self.clear_error();

        let missing = draft.blank_fields();
        if !missing.is_empty() {
            let err = SyncError::Validation { missing };
            debug!(error = %err, "users: create rejected");
            self.record_failure(&err);
            return Err(err);
        }

        let request = CreateUserRequest::from(&*draft);
        let response = match self.transport.create(&request).await {
            Ok(response) => response,
            Err(source) => {
                return Err(self.fail(SyncError::Transport {
                    operation: Operation::Create,
                    source,
                }))
            }
        };
        if !response.is_success() {
            return Err(self.fail(SyncError::Server {
                operation: Operation::Create,
                status: response.status,
                body: response.body,
            }));
        }

        info!(status = response.status, email = %request.email, "users: created");
        *draft = Draft::default();
        self.resync(Operation::Create).await;
        Ok(())
    }

    /// Deletes the record with the normalized identifier `id` and re-fetches the collection.
    pub async fn delete(&self, id: &RecordId) -> Result<(), SyncError> {
        self.clear_error();

        let response = match self.transport.delete(id).await {
            Ok(response) => response,
            Err(source) => {
                return Err(self.fail(SyncError::Transport {
                    operation: Operation::Delete,
                    source,
                }))
            }
        };
        if !response.is_success() {
            // Only the status is reported for deletes.
            return Err(self.fail(SyncError::Server {
                operation: Operation::Delete,
                status: response.status,
                body: String::new(),
            }));
        }

        info!(status = response.status, record_id = %id, "users: deleted");
        self.resync(Operation::Delete).await;
        Ok(())
    }

    async fn fetch_records(&self) -> Result<Vec<UserRecord>, SyncError> {
        let response = self
            .transport
            .list()
            .await
            .map_err(|source| SyncError::Transport {
                operation: Operation::List,
                source,
            })?;
        if !response.is_success() {
            return Err(SyncError::Server {
                operation: Operation::List,
                status: response.status,
                body: String::new(),
            });
        }

        let payload: serde_json::Value =
            serde_json::from_str(&response.body).map_err(|err| SyncError::Transport {
                operation: Operation::List,
                source: TransportError::Decode(err),
            })?;
        Ok(records_from_payload(payload))
    }

    async fn resync(&self, after: Operation) {
        if let Err(err) = self.list().await {
            debug!(
                after = after.method(),
                error = %err,
                "users: refresh after mutation failed"
            );
        }
    }

    fn clear_error(&self) {
        self.state
            .send_if_modified(|state| state.error_message.take().is_some());
    }

    fn record_failure(&self, err: &SyncError) {
        let message = err.to_string();
        self.state
            .send_modify(|state| state.error_message = Some(message));
    }

    fn fail(&self, err: SyncError) -> SyncError {
        warn!(
            operation = err.operation().method(),
            kind = err.kind().as_str(),
            error = %err,
            "users: request failed"
        );
        self.record_failure(&err);
        err
    }
}

/// Records carried by a list payload. Anything other than a JSON array
/// yields an empty collection; array items that are not records are skipped.
pub fn records_from_payload(payload: serde_json::Value) -> Vec<UserRecord> {
    let serde_json::Value::Array(items) = payload else {
        warn!("users: list payload is not an array; showing an empty collection");
        return Vec::new();
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<UserRecord>(item) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(index, error = %err, "users: skipping malformed record");
                None
            }
        })
        .collect()
}

/// Holds `is_loading` up for its lifetime, including when the request future is dropped.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SyncState>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a watch::Sender<SyncState>) -> Self {
        state.send_modify(|state| state.is_loading = true);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.is_loading = false);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
