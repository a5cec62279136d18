//! Ordered fallback across interchangeable backends
//!
//! Runs an async operation against the first candidate (e.g. an AI model id)
//! and moves on to the next one only when the error is classified as
//! recoverable by switching, such as a quota rejection. Any other error, or
//! an error on the last candidate, is returned as-is.

use std::future::Future;
use tracing::{info, warn};

/// Non-empty, de-duplicated list of candidates, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    primary: String,
    fallbacks: Vec<String>,
}

impl FallbackChain {
    /// Builds a chain from `primary` plus `rest`, dropping blanks and
    /// duplicates while keeping first-seen order.
    pub fn new(primary: impl Into<String>, rest: impl IntoIterator<Item = String>) -> Self {
        let primary = primary.into();
        let mut fallbacks: Vec<String> = Vec::new();
        for candidate in rest {
            let candidate = candidate.trim().to_string();
            if candidate.is_empty() || candidate == primary || fallbacks.contains(&candidate) {
                continue;
            }
            fallbacks.push(candidate);
        }
        Self { primary, fallbacks }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}

/// Value produced by [`run_with_fallback`] with the candidate that produced it.
#[derive(Debug, Clone)]
pub struct FallbackOutcome<T> {
    pub value: T,
    pub candidate: String,
}

/// Execute `operation` for each candidate until one succeeds.
///
/// `should_fallback` decides whether an error justifies trying the next
/// candidate. `on_fallback` is invoked once per switch (metrics hook).
pub async fn run_with_fallback<F, Fut, T, E>(
    chain: &FallbackChain,
    mut operation: F,
    should_fallback: impl Fn(&E) -> bool,
    on_fallback: impl Fn(&str, &str),
    operation_name: &str,
) -> Result<FallbackOutcome<T>, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut remaining = chain.fallbacks.iter();
    let mut current = chain.primary.clone();
    let mut attempt = 1u32;

    loop {
        match operation(current.clone()).await {
            Ok(value) => {
                if attempt > 1 {
                    info!(
                        operation = operation_name,
                        candidate = %current,
                        attempt,
                        "Succeeded on fallback candidate"
                    );
                }
                return Ok(FallbackOutcome {
                    value,
                    candidate: current,
                });
            }
            Err(err) => match remaining.next() {
                Some(next) if should_fallback(&err) => {
                    warn!(
                        operation = operation_name,
                        candidate = %current,
                        next = %next,
                        attempt,
                        error = %err,
                        "Candidate rejected, switching"
                    );
                    on_fallback(&current, next);
                    current = next.clone();
                    attempt += 1;
                }
                _ => {
                    warn!(
                        operation = operation_name,
                        candidate = %current,
                        attempt,
                        error = %err,
                        "Operation failed permanently"
                    );
                    return Err(err);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn chain() -> FallbackChain {
        FallbackChain::new(
            "a",
            vec!["b".to_string(), "a".to_string(), " ".to_string(), "c".to_string(), "b".to_string()],
        )
    }

    #[test]
    fn chain_dedups_in_order() {
        let c = chain();
        assert_eq!(c.candidates().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(c.primary(), "a");
    }

    #[tokio::test]
    async fn moves_on_only_for_recoverable_errors() {
        let tried = Mutex::new(Vec::new());
        let result = run_with_fallback(
            &chain(),
            |model| {
                tried.lock().unwrap().push(model.clone());
                async move {
                    if model == "c" {
                        Ok(42)
                    } else {
                        Err("quota exceeded".to_string())
                    }
                }
            },
            |e: &String| e.contains("quota"),
            |_, _| {},
            "test",
        )
        .await
        .unwrap();

        assert_eq!(result.value, 42);
        assert_eq!(result.candidate, "c");
        assert_eq!(*tried.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn stops_on_non_recoverable_error() {
        let calls = AtomicUsize::new(0);
        let switches = AtomicUsize::new(0);
        let result: Result<FallbackOutcome<()>, String> = run_with_fallback(
            &chain(),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("bad request".to_string()) }
            },
            |e: &String| e.contains("quota"),
            |_, _| {
                switches.fetch_add(1, Ordering::SeqCst);
            },
            "test",
        )
        .await;

        assert_eq!(result.unwrap_err(), "bad request");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(switches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn returns_last_error_when_exhausted() {
        let result: Result<FallbackOutcome<()>, String> = run_with_fallback(
            &chain(),
            |model| async move { Err(format!("quota on {model}")) },
            |e: &String| e.contains("quota"),
            |_, _| {},
            "test",
        )
        .await;

        assert_eq!(result.unwrap_err(), "quota on c");
    }
}
