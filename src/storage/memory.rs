//! In-process watermark store for tests and dry runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Watermark;
use crate::storage::WatermarkStore;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    marks: Mutex<HashMap<String, Watermark>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, board_key: impl Into<String>, watermark: Watermark) -> Self {
        if let Ok(marks) = self.marks.get_mut() {
            marks.insert(board_key.into(), watermark);
        }
        self
    }

    /// Synchronous read for assertions.
    pub fn snapshot(&self, board_key: &str) -> Option<Watermark> {
        self.marks.lock().ok()?.get(board_key).cloned()
    }
}

#[async_trait]
impl WatermarkStore for MemoryStorage {
    async fn get(&self, board_key: &str) -> Result<Option<Watermark>> {
        let marks = self
            .marks
            .lock()
            .map_err(|_| AppError::storage("watermark map poisoned"))?;
        Ok(marks.get(board_key).cloned())
    }

    async fn set(&self, board_key: &str, watermark: &Watermark) -> Result<()> {
        let mut marks = self
            .marks
            .lock()
            .map_err(|_| AppError::storage("watermark map poisoned"))?;
        marks.insert(board_key.to_string(), watermark.clone());
        Ok(())
    }
}
