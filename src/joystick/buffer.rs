//! Fixed-capacity sample ring buffer.
//!
//! Every pipeline stage keeps its recent history in one of these. Storage is
//! an inline array, so pushing never allocates; once full, each push
//! overwrites the oldest element.

/// Ring buffer of `N` copyable samples.
///
/// # Examples
///
/// ```
/// use magjoy::joystick::buffer::SampleBuffer;
///
/// let mut buf: SampleBuffer<i32, 3> = SampleBuffer::new();
/// for v in 1..=4 {
///     buf.push(v);
/// }
/// assert_eq!(buf.len(), 3);
/// assert_eq!(buf.get(0), Some(2)); // 1 was overwritten
/// assert_eq!(buf.last(), Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct SampleBuffer<T, const N: usize> {
    data: [T; N],
    head: usize, // Next write position
    len: usize,
}

impl<T: Copy + Default, const N: usize> SampleBuffer<T, N> {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of elements held.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of elements currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append an element, dropping the oldest one when full.
    #[inline]
    pub fn push(&mut self, value: T) {
        if N == 0 {
            return;
        }
        self.data[self.head] = value;
        self.head = (self.head + 1) % N;
        if self.len < N {
            self.len += 1;
        }
    }

    /// Most recently pushed element.
    #[inline]
    pub fn last(&self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        Some(self.data[(self.head + N - 1) % N])
    }

    /// Element at logical `index`, oldest first.
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let tail = (self.head + N - self.len) % N;
        Some(self.data[(tail + index) % N])
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

impl<T: Copy + Default, const N: usize> Default for SampleBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
