//! Building memoized functions from configuration.
//!
//! Run with: `cargo run --example memoize_builder`

use memokit::adapter::{CallableKind, Decorated};
use memokit::builder::{MemoizeBuilder, MemoizeConfig, StorePolicy};
use memokit::{CallArgs, ConfigError, KeyError, Value, call_args};

fn render(args: &CallArgs) -> Result<String, KeyError> {
    Ok(args
        .positional()
        .iter()
        .map(|value| format!("{value:?}"))
        .collect::<Vec<_>>()
        .join(", "))
}

fn area(args: &CallArgs) -> Result<i64, KeyError> {
    match args.get(0) {
        Some(Value::Tuple(sides)) => Ok(sides
            .iter()
            .map(|side| match side {
                Value::Int(n) => *n,
                _ => 1,
            })
            .product()),
        _ => Err(KeyError::custom("expected a tuple of sides")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // LRU-bounded cache with typed keys
    let lru = MemoizeBuilder::new()
        .typed(true)
        .policy(StorePolicy::Lru { capacity: 2 })
        .try_build(render)?;
    for n in [1, 2, 1, 3, 2] {
        lru.call(&call_args!(n))?;
    }
    println!("lru: {:?}", lru.info());
    println!("lru store: {:?}", lru.store_metrics());

    // Weight-bounded cache: values above the budget are returned but not kept
    let weighted = MemoizeBuilder::new()
        .policy(StorePolicy::Weighted {
            max_weight: 32,
            max_entries: None,
        })
        .weigher(|text: &String| text.len())
        .try_build(render)?;
    weighted.call(&call_args!(Value::list((0..40).collect::<Vec<i64>>())))?;
    weighted.call(&call_args!("short"))?;
    println!("weighted: {:?}", weighted.info());

    // Accessor shape: the receiver is the first argument
    let cached_area = MemoizeBuilder::new().try_build_decorated(Decorated::Accessor(area))?;
    assert_eq!(cached_area.kind(), CallableKind::Accessor);
    println!("area: {}", cached_area.get::<KeyError>(Value::tuple([3, 4]))?);
    println!("area: {}", cached_area.get::<KeyError>(Value::tuple([3, 4]))?);
    println!("accessor: {:?}", cached_area.inner().info());

    // Invalid configuration is reported, not panicked on
    let config = MemoizeConfig {
        policy: StorePolicy::Bounded { capacity: 0 },
        ..MemoizeConfig::default()
    };
    let rejected: Result<_, ConfigError> = MemoizeBuilder::from_config(config).try_build(render);
    if let Err(err) = rejected {
        println!("config error: {err}");
    }
    Ok(())
}
