//! Bounded close-price history, newest first.

use std::collections::VecDeque;

/// Ring buffer of the most recent closes.
///
/// `closes()` exposes the history most-recent-first, which is the layout the
/// SMA primitive reads. The oldest close is dropped once `capacity` is
/// reached, so a long session keeps constant memory. Storage grows with the
/// pushed history rather than being reserved up front.
#[derive(Debug, Clone)]
pub struct CloseSeries {
    buf: VecDeque<f64>,
    capacity: usize,
}

impl CloseSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity >= 1, "capacity must be >= 1");
        Self {
            buf: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, close: f64) {
        if self.buf.len() == self.capacity {
            self.buf.pop_back();
        }
        self.buf.push_front(close);
    }

    /// History as a contiguous slice, index 0 = latest close.
    pub fn closes(&mut self) -> &[f64] {
        self.buf.make_contiguous()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
