//! Backing stores for memoized results.
//!
//! | Store          | Bound          | When full                      |
//! |----------------|----------------|--------------------------------|
//! | `HashMapStore` | none / entries | rejects new keys               |
//! | `LruStore`     | entries        | evicts least recently used     |
//! | `WeightStore`  | total weight   | rejects values over the budget |

pub mod hashmap;
pub mod lru;
pub mod traits;
pub mod weight;

pub use hashmap::HashMapStore;
pub use lru::LruStore;
pub use traits::{StoreCore, StoreMetrics, StoreMut, StoreRejected};
pub use weight::WeightStore;

/// Most entries a bounded store reserves up front; larger bounds grow on demand.
pub(crate) const PREALLOCATE_LIMIT: usize = 1 << 10;
