//! File chunker for outbound transfers.
//!
//! Splits a named source file into bounded fragments and emits one
//! chunk envelope per fragment under a short destination alias. The
//! alias is the first few characters of the base name plus a per-client
//! sequence number, so transfers from one session never collide even
//! when source base names do.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use notehub_core::{AppError, AppResult};
use notehub_proto::{Envelope, markers};

use crate::store::FileStore;

/// Maximum characters of the source base name carried into an alias.
const ALIAS_STEM_LEN: usize = 4;

/// Splits source files into chunk envelopes.
#[derive(Debug)]
pub struct Chunker {
    user: String,
    store: FileStore,
    chunk_size: usize,
    /// Source name → most recent alias. Regenerated on every call:
    /// re-sending a file yields a new alias (see DESIGN.md).
    aliases: HashMap<String, String>,
    sequence: u64,
}

impl Chunker {
    /// Creates a chunker for one client session.
    pub fn new(user: impl Into<String>, store: FileStore, chunk_size: usize) -> Self {
        Self {
            user: user.into(),
            store,
            chunk_size: chunk_size.max(1),
            aliases: HashMap::new(),
            sequence: 0,
        }
    }

    /// Chunks `filename` from the store onto `out`, returning the alias.
    ///
    /// An unreadable or unrecognized source emits nothing and surfaces
    /// the error; the caller annotates the chat line instead of aborting.
    pub async fn chunk(
        &mut self,
        filename: &str,
        out: &mpsc::Sender<Envelope>,
    ) -> AppResult<String> {
        let format = markers::image_extension(filename)
            .ok_or_else(|| AppError::validation(format!("unrecognized image name {filename:?}")))?
            .to_string();

        let data = self.store.read(filename).await?;

        self.sequence += 1;
        let stem: String = markers::base_name(filename)
            .chars()
            .take(ALIAS_STEM_LEN)
            .collect();
        let alias = format!("{stem}_{}{format}", self.sequence);
        self.aliases.insert(filename.to_string(), alias.clone());

        let total = data.len();
        for fragment in data.chunks(self.chunk_size) {
            out.send(Envelope::chunk(
                &self.user,
                alias.clone(),
                fragment.to_vec(),
                format.clone(),
            ))
            .await
            .map_err(|_| AppError::transport("outbound queue closed"))?;
        }

        debug!(
            source = %filename,
            alias = %alias,
            bytes = total,
            chunks = total.div_ceil(self.chunk_size),
            "file chunked"
        );

        Ok(alias)
    }

    /// The most recent alias assigned to `filename`, if any.
    pub fn alias_of(&self, filename: &str) -> Option<&str> {
        self.aliases.get(filename).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notehub_proto::Payload;

    async fn store_with(name: &str, data: &[u8]) -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).await.expect("open");
        tokio::fs::write(dir.path().join(name), data)
            .await
            .expect("write fixture");
        (dir, store)
    }

    fn chunk_parts(env: &Envelope) -> (&str, &[u8], &str) {
        match &env.payload {
            Some(Payload::Chunk {
                name,
                bytes,
                format,
            }) => (name, bytes, format),
            other => panic!("expected chunk payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chunk_count_and_sizes() {
        // 300 KiB at a 128 KiB bound: 3 chunks, last one 44 KiB.
        let data = vec![42u8; 300 * 1024];
        let (_dir, store) = store_with("cat.png", &data).await;
        let mut chunker = Chunker::new("alice", store, 128 * 1024);
        let (tx, mut rx) = mpsc::channel(16);

        let alias = chunker.chunk("cat.png", &tx).await.expect("chunk");
        assert_eq!(alias, "cat_1.png");
        drop(tx);

        let mut envelopes = Vec::new();
        while let Some(env) = rx.recv().await {
            envelopes.push(env);
        }
        assert_eq!(envelopes.len(), 3);

        let mut total = 0;
        for env in &envelopes {
            assert_eq!(env.sender, "ftransfer_alice");
            let (name, bytes, format) = chunk_parts(env);
            assert_eq!(name, "cat_1.png");
            assert_eq!(format, ".png");
            total += bytes.len();
        }
        assert_eq!(total, data.len());
        assert_eq!(chunk_parts(&envelopes[2]).1.len(), 44 * 1024);
    }

    #[tokio::test]
    async fn test_exact_multiple_has_full_final_chunk() {
        let data = vec![1u8; 256 * 1024];
        let (_dir, store) = store_with("dog.jpg", &data).await;
        let mut chunker = Chunker::new("bob", store, 128 * 1024);
        let (tx, mut rx) = mpsc::channel(16);

        chunker.chunk("dog.jpg", &tx).await.expect("chunk");
        drop(tx);

        let mut sizes = Vec::new();
        while let Some(env) = rx.recv().await {
            sizes.push(chunk_parts(&env).1.len());
        }
        assert_eq!(sizes, vec![128 * 1024, 128 * 1024]);
    }

    #[tokio::test]
    async fn test_resend_produces_new_alias() {
        let (_dir, store) = store_with("cat.png", b"data").await;
        let mut chunker = Chunker::new("alice", store, 1024);
        let (tx, mut rx) = mpsc::channel(16);

        let first = chunker.chunk("cat.png", &tx).await.expect("chunk");
        let second = chunker.chunk("cat.png", &tx).await.expect("chunk");
        assert_eq!(first, "cat_1.png");
        assert_eq!(second, "cat_2.png");
        assert_eq!(chunker.alias_of("cat.png"), Some("cat_2.png"));
        drop(tx);

        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn test_long_base_name_is_abbreviated() {
        let (_dir, store) = store_with("sunflowers.jpg", b"x").await;
        let mut chunker = Chunker::new("alice", store, 1024);
        let (tx, mut rx) = mpsc::channel(16);

        let alias = chunker.chunk("sunflowers.jpg", &tx).await.expect("chunk");
        assert_eq!(alias, "sunf_1.jpg");
        drop(tx);
        while rx.recv().await.is_some() {}
    }

    #[tokio::test]
    async fn test_unreadable_source_emits_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::open(dir.path()).await.expect("open");
        let mut chunker = Chunker::new("alice", store, 1024);
        let (tx, mut rx) = mpsc::channel(16);

        chunker.chunk("missing.png", &tx).await.expect_err("fails");
        assert!(chunker.alias_of("missing.png").is_none());
        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
