//! Memoizing a function over structured arguments.
//!
//! Run with: `cargo run --example basic_memoize`

use std::sync::atomic::{AtomicUsize, Ordering};

use memokit::store::HashMapStore;
use memokit::{CallArgs, HIPPIE_HASHING, KeyError, Value, call_args, memoize, wrap};

fn total_price(args: &CallArgs) -> Result<f64, KeyError> {
    let Some(Value::List(items)) = args.get(0) else {
        return Err(KeyError::custom("expected a list of prices"));
    };
    let discount = match args.keyword("discount") {
        Some(Value::Float(d)) => *d,
        Some(Value::Int(d)) => *d as f64,
        _ => 0.0,
    };
    let sum: f64 = items
        .iter()
        .filter_map(|item| match item {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        })
        .sum();
    Ok(sum * (1.0 - discount))
}

fn main() -> Result<(), KeyError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Lists are mutable containers, yet they key by content
    let priced = memoize(total_price);
    let basket = call_args!(Value::list([10, 20, 30]); discount = 0.1);
    println!("first:  {}", priced.call(&basket)?);
    println!("second: {}", priced.call(&basket)?);
    println!("info:   {:?}", priced.info());

    // Typed keys keep 1 and 1.0 apart
    let evaluations = AtomicUsize::new(0);
    let describe = wrap(
        |args: &CallArgs| -> Result<String, KeyError> {
            evaluations.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{:?}", args.get(0)))
        },
        HashMapStore::unbounded(),
        HIPPIE_HASHING,
    );
    describe.call(&call_args!(1))?;
    describe.call(&call_args!(1.0))?;
    println!("typed evaluations: {}", evaluations.load(Ordering::SeqCst));

    priced.clear();
    println!("after clear: {:?}", priced.info());
    Ok(())
}
