#![forbid(unsafe_code)]

/// Fixed-capacity ring buffer for rolling sensor windows. Pushing past
/// capacity evicts the oldest sample; storage never grows.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    items: Vec<f64>,
    capacity: usize,
    head: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            head: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.items.len() < self.capacity {
            self.items.push(value);
        } else {
            self.items[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.head = 0;
    }

    /// Oldest-to-newest iteration order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (newer, older) = self.items.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_ring_01_push_evicts_oldest_at_capacity() {
        let mut r = RingBuffer::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            r.push(v);
        }
        assert_eq!(r.len(), 3);
        let got: Vec<f64> = r.iter().collect();
        assert_eq!(got, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn at_ring_02_iteration_order_before_wrap() {
        let mut r = RingBuffer::new(4);
        r.push(9.0);
        r.push(8.0);
        let got: Vec<f64> = r.iter().collect();
        assert_eq!(got, vec![9.0, 8.0]);
    }

    #[test]
    fn at_ring_03_clear_resets_state() {
        let mut r = RingBuffer::new(2);
        r.push(1.0);
        r.push(2.0);
        r.push(3.0);
        r.clear();
        assert!(r.is_empty());
        r.push(5.0);
        let got: Vec<f64> = r.iter().collect();
        assert_eq!(got, vec![5.0]);
    }
}
