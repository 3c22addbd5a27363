use paramfile_rs::{CompiledFunction, FunctionCache};
use std::collections::HashMap;
use std::time::Instant;

fn main() -> paramfile_rs::Result<()> {
    pretty_env_logger::init();

    let constants = HashMap::from([("H".to_string(), 660e3), ("Ttop".to_string(), 273.0)]);
    let expression = "Ttop + 1600 * (1 - y/H) + 10*sin(pi*x/H)*sin(pi*y/H)";

    let cache = FunctionCache::new(16);
    let temperature = cache.get_or_compile(expression, ["x", "y"], &constants)?;

    let n = 500;
    let points: Vec<[f64; 2]> = (0..n * n)
        .map(|i| {
            let (ix, iy) = (i % n, i / n);
            [660e3 * ix as f64 / n as f64, 660e3 * iy as f64 / n as f64]
        })
        .collect();

    let start = Instant::now();
    let values = temperature.evaluate_batch(&points)?;
    println!(
        "Evaluated {} points in {:?}",
        values.len(),
        start.elapsed()
    );

    let (min, max) = values
        .iter()
        .map(|v| v[0])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)));
    println!("Temperature range: {:.1} K to {:.1} K", min, max);

    // A second request for the same expression is served from the cache.
    let again = cache.get_or_compile(expression, ["x", "y"], &constants)?;
    println!("Cached: {}", std::sync::Arc::ptr_eq(&temperature, &again));

    let sequential = CompiledFunction::compile(expression, ["x", "y"], &constants)?;
    println!("Value at the origin: {:?}", sequential.evaluate(&[0.0, 0.0])?);
    Ok(())
}
