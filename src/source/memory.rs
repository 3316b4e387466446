//! Scripted in-memory feed source.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::source::FeedSource;

const MEMORY_URL: &str = "memory://feed";

/// What the next fetch returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Successful response with this body
    Body(String),
    /// Response with a non-success status code
    Status(u16),
    /// Transport failure (no response at all)
    Unreachable,
}

/// Returns the current [`Reply`] on every fetch and counts fetches.
#[derive(Debug)]
pub struct MemoryFeedSource {
    reply: Mutex<Reply>,
    fetches: AtomicUsize,
}

impl MemoryFeedSource {
    /// Source that serves `body` until told otherwise.
    pub fn new(body: impl Into<String>) -> Self {
        Self::with_reply(Reply::Body(body.into()))
    }

    pub fn with_reply(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Serve `body` from now on.
    pub fn set_body(&self, body: impl Into<String>) {
        self.set_reply(Reply::Body(body.into()));
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.lock() = reply;
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Reply> {
        self.reply.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl FeedSource for MemoryFeedSource {
    async fn fetch_text(&self) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let reply = self.lock().clone();
        match reply {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(AppError::status(MEMORY_URL, status)),
            Reply::Unreachable => Err(AppError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "memory feed unreachable",
            ))),
        }
    }

    fn describe(&self) -> String {
        MEMORY_URL.to_string()
    }
}
