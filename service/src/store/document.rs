use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use minesweeper_core::UserGame;
use tempfile::NamedTempFile;

use super::GameStore;
use crate::{StoreError, StoreResult};

const PREFIX: &str = "user-";
const EXTENSION: &str = "json";

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const ABANDONED: u8 = 2;

/// Durable store keeping one JSON document per user in a directory.
///
/// Documents are replaced whole through a temporary file and a rename, so a
/// reader sees either the old or the new record. Every file operation runs
/// under `timeout`. A mutation that times out before it starts never runs,
/// and one that has started is waited for, so an error always means nothing
/// was written.
#[derive(Debug)]
pub struct DocumentStore {
    root: PathBuf,
    timeout: Duration,
    writer: Mutex<()>,
}

impl DocumentStore {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

    pub fn open(root: impl Into<PathBuf>, timeout: Duration) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        log::debug!("Opened document store at {}", root.display());
        Ok(Self {
            root,
            timeout,
            writer: Mutex::new(()),
        })
    }

    fn document_path(&self, user_id: &str) -> PathBuf {
        let encoded: String = user_id.bytes().map(|b| format!("{b:02x}")).collect();
        self.root.join(format!("{PREFIX}{encoded}.{EXTENSION}"))
    }

    /// Runs `op` on a helper thread and gives up once `timeout` elapses.
    fn with_timeout<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> StoreResult<T> + Send + 'static,
    {
        let rx = spawn_io(op)?;
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(self.timed_out()),
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::WorkerLost),
        }
    }

    /// Like [`Self::with_timeout`] for mutations, which must not land after
    /// the caller has been told they failed.
    fn commit<F>(&self, op: F) -> StoreResult<()>
    where
        F: FnOnce() -> StoreResult<()> + Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(PENDING));
        let worker_state = Arc::clone(&state);
        let rx = spawn_io(move || {
            if leave_pending(&worker_state, STARTED) {
                op()
            } else {
                // the caller already reported a timeout
                Ok(())
            }
        })?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) if leave_pending(&state, ABANDONED) => {
                Err(self.timed_out())
            }
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("Waiting for a write already in progress");
                rx.recv().unwrap_or(Err(StoreError::WorkerLost))
            }
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::WorkerLost),
        }
    }

    fn timed_out(&self) -> StoreError {
        log::warn!(
            "Document store at {} did not answer within {:?}",
            self.root.display(),
            self.timeout
        );
        StoreError::Timeout(self.timeout)
    }

    fn read(&self, user_id: &str) -> StoreResult<Option<UserGame>> {
        let path = self.document_path(user_id);
        self.with_timeout(move || read_document(&path))
    }

    fn write(&self, user_game: &UserGame) -> StoreResult<()> {
        let root = self.root.clone();
        let path = self.document_path(&user_game.user_id);
        let bytes = serde_json::to_vec(user_game)?;
        self.commit(move || write_document(&root, &path, &bytes))
    }

    fn lock_writer(&self) -> std::sync::MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Moves a mutation out of `PENDING`; only one of the worker and the caller wins.
fn leave_pending(state: &AtomicU8, to: u8) -> bool {
    state
        .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

fn spawn_io<T, F>(op: F) -> StoreResult<Receiver<StoreResult<T>>>
where
    T: Send + 'static,
    F: FnOnce() -> StoreResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("document-store-io".into())
        .spawn(move || {
            // the caller may have stopped waiting
            let _ = tx.send(op());
        })?;
    Ok(rx)
}

fn is_document(path: &Path) -> bool {
    let has_prefix = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(PREFIX));
    has_prefix && path.extension().is_some_and(|ext| ext == EXTENSION)
}

fn list_documents(root: &Path) -> StoreResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if is_document(&path) {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn read_document(path: &Path) -> StoreResult<Option<UserGame>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn write_document(root: &Path, path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut staging = NamedTempFile::new_in(root)?;
    staging.write_all(bytes)?;
    staging.persist(path).map_err(|err| err.error)?;
    Ok(())
}

impl GameStore for DocumentStore {
    fn get(&self, user_id: &str) -> StoreResult<Option<UserGame>> {
        self.read(user_id)
    }

    fn get_all(&self) -> StoreResult<Vec<UserGame>> {
        let root = self.root.clone();
        self.with_timeout(move || {
            let mut user_games = Vec::new();
            for path in list_documents(&root)? {
                // a concurrent delete_all may remove it between listing and reading
                if let Some(user_game) = read_document(&path)? {
                    user_games.push(user_game);
                }
            }
            Ok(user_games)
        })
    }

    fn upsert(&self, user_game: UserGame) -> StoreResult<()> {
        let _writer = self.lock_writer();
        self.write(&user_game)
    }

    fn delete_all(&self) -> StoreResult<()> {
        let _writer = self.lock_writer();
        let root = self.root.clone();
        self.commit(move || {
            let paths = list_documents(&root)?;
            log::debug!("Deleting {} user document(s)", paths.len());
            for path in paths {
                fs::remove_file(path)?;
            }
            Ok(())
        })
    }

    fn update(
        &self,
        user_id: &str,
        mutate: &mut dyn FnMut(&mut UserGame) -> bool,
    ) -> StoreResult<()> {
        let _writer = self.lock_writer();
        let mut record = self
            .read(user_id)?
            .unwrap_or_else(|| UserGame::new(user_id));
        if mutate(&mut record) {
            self.write(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::contract;
    use super::*;

    fn store() -> (tempfile::TempDir, DocumentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path(), DocumentStore::DEFAULT_TIMEOUT).unwrap();
        (dir, store)
    }

    #[test]
    fn get_unknown_user_is_none() {
        let (_dir, store) = store();
        contract::get_unknown_user_is_none(&store);
    }

    #[test]
    fn upsert_inserts_then_replaces() {
        let (_dir, store) = store();
        contract::upsert_inserts_then_replaces(&store);
    }

    #[test]
    fn users_are_isolated() {
        let (_dir, store) = store();
        contract::users_are_isolated(&store);
    }

    #[test]
    fn delete_all_clears_everything() {
        let (_dir, store) = store();
        contract::delete_all_clears_everything(&store);
    }

    #[test]
    fn update_writes_only_when_asked() {
        let (_dir, store) = store();
        contract::update_writes_only_when_asked(&store);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let (_dir, store) = store();
        contract::concurrent_updates_are_not_lost(&store);
    }

    #[test]
    fn records_survive_reopening() {
        let (dir, store) = store();
        let alice = contract::user_game("alice", &[1, 2]);
        store.upsert(alice.clone()).unwrap();
        drop(store);

        let reopened = DocumentStore::open(dir.path(), DocumentStore::DEFAULT_TIMEOUT).unwrap();

        assert_eq!(reopened.get("alice").unwrap(), Some(alice));
    }

    #[test]
    fn user_ids_map_to_safe_file_names() {
        let (dir, store) = store();
        store.upsert(contract::user_game("../escape/me", &[1])).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["user-2e2e2f6573636170652f6d65.json"]);
        assert!(store.get("../escape/me").unwrap().is_some());
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let (dir, store) = store();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        store.upsert(contract::user_game("alice", &[1])).unwrap();

        store.delete_all().unwrap();

        assert!(store.get_all().unwrap().is_empty());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn corrupt_document_is_a_storage_failure() {
        let (_dir, store) = store();
        fs::write(store.document_path("alice"), b"{ not json").unwrap();

        assert!(matches!(
            store.get("alice"),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn slow_operation_times_out() {
        let (_dir, store) = store();
        let store = DocumentStore {
            timeout: Duration::from_millis(10),
            ..store
        };

        let result = store.with_timeout(|| {
            thread::sleep(Duration::from_millis(200));
            Ok(())
        });

        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[test]
    fn only_acknowledged_writes_are_persisted() {
        let (_dir, store) = store();
        let impatient = DocumentStore {
            timeout: Duration::ZERO,
            ..store
        };

        let mut acknowledged = None;
        for game_id in 0..20 {
            let record = contract::user_game("alice", &[game_id]);
            if impatient.upsert(record.clone()).is_ok() {
                acknowledged = Some(record);
            }
        }
        thread::sleep(Duration::from_millis(100));

        let store = DocumentStore {
            timeout: DocumentStore::DEFAULT_TIMEOUT,
            ..impatient
        };
        assert_eq!(store.get("alice").unwrap(), acknowledged);
    }

    #[test]
    fn timed_out_write_cannot_overwrite_a_later_update() {
        let (_dir, store) = store();
        let impatient = DocumentStore {
            timeout: Duration::ZERO,
            ..store
        };
        let _ = impatient.upsert(contract::user_game("alice", &[1]));

        let store = DocumentStore {
            timeout: DocumentStore::DEFAULT_TIMEOUT,
            ..impatient
        };
        let latest = contract::user_game("alice", &[2]);
        store
            .update("alice", &mut |user_game| {
                *user_game = latest.clone();
                true
            })
            .unwrap();
        thread::sleep(Duration::from_millis(100));

        assert_eq!(store.get("alice").unwrap(), Some(latest));
    }

    #[test]
    fn commit_result_matches_whether_it_ran() {
        let (_dir, store) = store();
        let store = DocumentStore {
            timeout: Duration::from_millis(10),
            ..store
        };
        let ran = Arc::new(AtomicU8::new(0));

        let worker_ran = Arc::clone(&ran);
        let result = store.commit(move || {
            thread::sleep(Duration::from_millis(50));
            worker_ran.store(1, Ordering::SeqCst);
            Ok(())
        });
        thread::sleep(Duration::from_millis(200));

        assert_eq!(result.is_ok(), ran.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn writes_leave_no_staging_files() {
        let (dir, store) = store();
        for game_id in 0..5 {
            store.upsert(contract::user_game("alice", &[game_id])).unwrap();
        }

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
