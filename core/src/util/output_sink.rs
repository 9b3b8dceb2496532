use std::sync::{Arc, Mutex, PoisonError};

/// Growable byte buffer shared by the stream pumps when output capture is
/// requested. Both pumps may write concurrently; the buffer is read once the
/// process has exited. Growth is unbounded.
pub struct OutputSink {
    inner: Mutex<Vec<u8>>,
}

impl OutputSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, data: &[u8]) {
        let mut g = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        g.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let g = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        g.clone()
    }

    pub fn to_string_lossy(&self) -> String {
        let g = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&g).to_string()
    }
}
