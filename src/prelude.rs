pub use crate::adapter::{CallableKind, Decorated, wrap_decorated};
pub use crate::args::CallArgs;
pub use crate::builder::{AnyStore, MemoizeBuilder, MemoizeConfig, StorePolicy};
pub use crate::call_args;
pub use crate::error::{ConfigError, KeyError};
pub use crate::key::{CacheKey, HIPPIE_HASHING, Hashing, KeyFunction, build_key_function};
pub use crate::memo::{CacheInfo, Memoized, infallible, memoize, wrap};
#[cfg(feature = "metrics")]
pub use crate::metrics::{
    MemoMetricsSnapshot, MetricsExporter, MetricsSnapshotProvider, PrometheusTextExporter,
};
pub use crate::store::{
    HashMapStore, LruStore, StoreCore, StoreMetrics, StoreMut, StoreRejected, WeightStore,
};
pub use crate::value::{Opaque, Scalar, TypeTag, Value};
