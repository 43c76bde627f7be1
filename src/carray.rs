//! A growable ring buffer with FIFO push/pop on both ends and O(1) indexed
//! reads, modeled on `carray.c`. Used for the proposer's pending-values
//! FIFO and its two instance queues; nothing here is Paxos-specific.

const INITIAL_CAPACITY: usize = 128;

pub struct CircularBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    count: usize,
}

impl<T> CircularBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        CircularBuffer {
            slots,
            head: 0,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    fn slot_index(&self, i: usize) -> usize {
        (self.head + i) % self.capacity()
    }

    fn grow(&mut self) {
        let new_capacity = self.capacity() * 2;
        let mut new_slots = Vec::with_capacity(new_capacity);
        new_slots.resize_with(new_capacity, || None);
        for i in 0..self.count {
            new_slots[i] = self.slots[self.slot_index(i)].take();
        }
        self.slots = new_slots;
        self.head = 0;
    }

    pub fn push_back(&mut self, item: T) {
        if self.is_full() {
            self.grow();
        }
        let idx = self.slot_index(self.count);
        self.slots[idx] = Some(item);
        self.count += 1;
    }

    pub fn push_front(&mut self, item: T) {
        if self.is_empty() {
            self.push_back(item);
            return;
        }
        if self.is_full() {
            self.grow();
        }
        self.head = (self.head + self.capacity() - 1) % self.capacity();
        self.slots[self.head] = Some(item);
        self.count += 1;
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.count -= 1;
        item
    }

    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.is_empty() {
            return None;
        }
        self.slots[self.head].as_mut()
    }

    pub fn at(&self, i: usize) -> Option<&T> {
        if i >= self.count {
            return None;
        }
        let idx = self.slot_index(i);
        self.slots[idx].as_ref()
    }

    pub fn at_mut(&mut self, i: usize) -> Option<&mut T> {
        if i >= self.count {
            return None;
        }
        let idx = self.slot_index(i);
        self.slots[idx].as_mut()
    }

    /// Index of the first element matching `pred`, scanning front to back.
    pub fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        (0..self.count).find(|&i| pred(self.at(i).expect("index within count")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.count).map(move |i| self.at(i).expect("index within count"))
    }

    /// Find the first element matching `pred`, remove it, and return it.
    /// Shifts the remaining elements to close the gap, mirroring the
    /// source's `instance_remove` (rebuild via `carray_reject`).
    pub fn take_first<F>(&mut self, mut pred: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut found = None;
        for i in 0..self.count {
            if pred(self.at(i).expect("index within count")) {
                found = Some(i);
                break;
            }
        }
        let i = found?;
        let idx = self.slot_index(i);
        let item = self.slots[idx].take();
        for j in i..self.count - 1 {
            let from = self.slot_index(j + 1);
            let to = self.slot_index(j);
            self.slots.swap(from, to);
        }
        let last = self.slot_index(self.count - 1);
        self.slots[last] = None;
        self.count -= 1;
        item
    }

    /// Build a new buffer with only the elements satisfying `pred`,
    /// matching `carray_collect`.
    pub fn collect<F>(&self, mut pred: F) -> CircularBuffer<T>
    where
        F: FnMut(&T) -> bool,
        T: Clone,
    {
        let mut out = CircularBuffer::with_capacity(self.capacity());
        for item in self.iter() {
            if pred(item) {
                out.push_back(item.clone());
            }
        }
        out
    }

    /// The complement of `collect`, equivalent to `carray_reject`.
    pub fn reject<F>(&self, mut pred: F) -> CircularBuffer<T>
    where
        F: FnMut(&T) -> bool,
        T: Clone,
    {
        self.collect(|item| !pred(item))
    }
}

impl<T> Default for CircularBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
