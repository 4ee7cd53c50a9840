//! Construction-time configuration.

use crate::error::MapError;

/// Bucket count used when no capacity is requested.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;
/// Upper bound on the bucket count. Always a power of two.
pub const MAXIMUM_CAPACITY: usize = 1 << 30;
/// Load factor used when none is requested.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Traversal order of a [`LinkedHashMap`](crate::LinkedHashMap).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OrderMode {
    /// Entries keep the position of their first insertion.
    #[default]
    Insertion,
    /// Successful lookups and value updates move the entry to the tail, so the
    /// head is always the least recently used entry.
    Access,
}

/// Sizing and ordering parameters accepted by the map constructors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    pub initial_capacity: usize,
    pub load_factor: f32,
    pub order: OrderMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            order: OrderMode::Insertion,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_order(mut self, order: OrderMode) -> Self {
        self.order = order;
        self
    }

    /// Reject load factors that cannot drive a resize policy.
    pub fn validate(&self) -> Result<(), MapError> {
        let lf = self.load_factor;
        if lf.is_nan() || lf.is_infinite() || lf <= 0.0 {
            return Err(MapError::InvalidLoadFactor(lf));
        }
        Ok(())
    }

    /// Bucket count actually allocated: the next power of two, clamped.
    pub fn bucket_count(&self) -> usize {
        table_size_for(self.initial_capacity)
    }
}

/// Smallest power of two `>= requested`, at least 1 and at most `MAXIMUM_CAPACITY`.
pub(crate) fn table_size_for(requested: usize) -> usize {
    requested.clamp(1, MAXIMUM_CAPACITY).next_power_of_two()
}

/// `min(capacity * load_factor, MAXIMUM_CAPACITY + 1)`, truncated.
pub(crate) fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    let t = (capacity as f64 * load_factor as f64).min((MAXIMUM_CAPACITY + 1) as f64);
    t as usize
}
