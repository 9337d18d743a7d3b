use std::env;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Env vars are process-wide, so tests touching `REPOSITORY_TYPE` or the
/// Mongo URIs take turns.
static ENV: Mutex<()> = Mutex::new(());

/// Holds the env lock and puts the previous values back when dropped,
/// including when the test body panics.
struct Restore {
    previous: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl Drop for Restore {
    fn drop(&mut self) {
        for (key, value) in self.previous.iter().rev() {
            apply(key, value.as_deref());
        }
    }
}

fn apply(key: &str, value: Option<&str>) {
    match value {
        Some(value) => env::set_var(key, value),
        None => env::remove_var(key),
    }
}

/// Runs `f` with each `(key, value)` applied: `Some` sets, `None` unsets.
pub fn with_scoped_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let lock = ENV.lock().unwrap_or_else(PoisonError::into_inner);
    let mut restore = Restore {
        previous: Vec::with_capacity(vars.len()),
        _lock: lock,
    };
    for (key, value) in vars {
        restore.previous.push((key.to_string(), env::var(key).ok()));
        apply(key, *value);
    }
    f()
}
