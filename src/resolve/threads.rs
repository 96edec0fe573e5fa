use serde_yaml::Value;

use crate::{
    config::*,
    error::{ResolveError, Result},
};

/// Coerce the merged thread count to a positive integer and write it back
pub fn coerce_threads(mut cfg: Config) -> Result<(Config, usize)> {
    let v = cfg.get(THREADS).cloned().unwrap_or(Value::Null);
    let n = match &v {
        // 4.0 is taken as 4
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|n| *n > 0)
    .and_then(|n| usize::try_from(n).ok())
    .ok_or_else(|| ResolveError::InvalidThreadCount(display_value(&v)))?;

    let cores = num_cpus::get();
    if n > cores {
        warn!(
            "Requested {} threads but only {} cores are available",
            n, cores
        );
    }
    info!("Number of threads: {}", n);
    cfg.set(THREADS, n);
    Ok((cfg, n))
}
