//! Session state: the assistant and thread identifiers reused across turns.

pub mod store;

pub use store::{JsonFileStore, ResourceKind, SessionStore};

use crate::api::{AssistantApi, AssistantSpec};
use crate::error::{ApiError, PersistenceError};
use std::future::Future;
use tracing::{debug, info, warn};

/// Identifiers bound to one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub assistant_id: String,
    pub thread_id: String,
}

/// Identifiers supplied explicitly, bypassing the persisted lookup.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub assistant_id: Option<String>,
    pub thread_id: Option<String>,
}

impl Session {
    /// Reuse or provision both identifiers.
    ///
    /// Explicit overrides win; otherwise the store is consulted and the
    /// remote resource is created on a miss.
    pub async fn establish(
        api: &dyn AssistantApi,
        store: &dyn SessionStore,
        spec: &AssistantSpec,
        overrides: &SessionOverrides,
    ) -> Result<Self, ApiError> {
        let assistant_id = match non_empty(&overrides.assistant_id) {
            Some(id) => id,
            None => {
                get_or_create(store, ResourceKind::Assistant, || api.create_assistant(spec))
                    .await?
            }
        };

        let thread_id = match non_empty(&overrides.thread_id) {
            Some(id) => id,
            None => get_or_create(store, ResourceKind::Thread, || api.create_thread()).await?,
        };

        info!("Session ready: assistant={assistant_id} thread={thread_id}");
        Ok(Self {
            assistant_id,
            thread_id,
        })
    }
}

fn non_empty(id: &Option<String>) -> Option<String> {
    id.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Return the persisted identifier for `kind`, or create and persist one.
///
/// Any lookup failure counts as a cache miss. A failed write is logged; the
/// fresh identifier is still returned. Two processes racing on first-time
/// creation may both create a resource; the last write wins.
pub async fn get_or_create<S, F, Fut>(
    store: &S,
    kind: ResourceKind,
    create: F,
) -> Result<String, ApiError>
where
    S: SessionStore + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    match store.load(kind) {
        Ok(id) => {
            debug!("Reusing persisted {kind} {id}");
            return Ok(id);
        }
        Err(PersistenceError::Missing) => debug!("No persisted {kind}, creating one"),
        Err(e) => warn!("Ignoring unusable {kind} record: {e}"),
    }

    let id = create().await?;
    info!("Created {kind} {id}");

    if let Err(e) = store.save(kind, &id) {
        warn!("Failed to persist {kind} id: {e}");
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    async fn create_counted(counter: &AtomicUsize, id: &str) -> Result<String, ApiError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(id.to_string())
    }

    #[tokio::test]
    async fn test_missing_record_creates_once_then_reuses() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let calls = AtomicUsize::new(0);

        let first = get_or_create(&store, ResourceKind::Thread, || {
            create_counted(&calls, "thread_1")
        })
        .await
        .unwrap();
        assert_eq!(first, "thread_1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = get_or_create(&store, ResourceKind::Thread, || {
            create_counted(&calls, "thread_2")
        })
        .await
        .unwrap();
        assert_eq!(second, "thread_1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_recreated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("assistant_data.json"), "garbage").unwrap();
        let store = JsonFileStore::new(dir.path());
        let calls = AtomicUsize::new(0);

        let id = get_or_create(&store, ResourceKind::Assistant, || {
            create_counted(&calls, "asst_new")
        })
        .await
        .unwrap();
        assert_eq!(id, "asst_new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.load(ResourceKind::Assistant).unwrap(), "asst_new");
    }

    #[tokio::test]
    async fn test_create_failure_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        let result = get_or_create(&store, ResourceKind::Thread, || async {
            Err(ApiError::Status {
                status: 500,
                body: "boom".into(),
            })
        })
        .await;
        assert!(result.is_err());
        assert!(matches!(
            store.load(ResourceKind::Thread),
            Err(PersistenceError::Missing)
        ));
    }

    #[tokio::test]
    async fn test_unwritable_store_still_returns_id() {
        let dir = TempDir::new().unwrap();
        // A regular file where the state directory should be.
        let blocker = dir.path().join("state");
        std::fs::write(&blocker, "").unwrap();
        let store = JsonFileStore::new(&blocker);

        let id = get_or_create(&store, ResourceKind::Thread, || async {
            Ok::<_, ApiError>("thread_x".to_string())
        })
        .await
        .unwrap();
        assert_eq!(id, "thread_x");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        assert_eq!(non_empty(&Some("  ".into())), None);
        assert_eq!(non_empty(&Some("asst_1".into())), Some("asst_1".into()));
        assert_eq!(non_empty(&None), None);
    }
}
