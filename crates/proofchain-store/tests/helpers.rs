use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use proofchain_core::{Chain, Difficulty};
use proofchain_store::TextStore;
use tempfile::{tempdir, TempDir};
use tracing_subscriber::filter::LevelFilter;

pub fn easy() -> Difficulty {
    Difficulty::new(1).expect("valid difficulty")
}

pub fn create_temp_store() -> (TempDir, TextStore) {
    // Keep the TempDir alive for as long as the store is used
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = TextStore::in_dir(temp_dir.path());
    (temp_dir, store)
}

/// Chain at difficulty 1 built from known-good proofs mined by "alice".
pub fn known_chain(proofs: &[u64]) -> Chain {
    let mut chain = Chain::new(easy());
    for proof in proofs {
        let block = Chain::build(*proof, chain.tip_hash(), "alice");
        chain.append(block).expect("known-good proof");
    }
    chain
}

pub fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("Failed to write fixture");
}

pub fn read_file(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read dump")
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber that records warnings, returning them as text.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(LevelFilter::WARN)
        .with_writer(move || writer.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (out, logs)
}
