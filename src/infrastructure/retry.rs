//! Exponential backoff with jitter for calls that may fail transiently.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub base_delay_ms: u64,
  pub max_delay_ms: u64,
  pub jitter_pct: f64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 5,
      base_delay_ms: 200,
      max_delay_ms: 10_000,
      jitter_pct: 0.20,
    }
  }
}

impl RetryPolicy {
  /// Delay before the retry following failed attempt `attempt_no` (1-based):
  /// `base * 2^(attempt_no - 1)`, capped, then jittered by ±`jitter_pct`
  pub fn delay_for(&self, attempt_no: u32, rng: &mut impl Rng) -> Duration {
    let exp = attempt_no.max(1) - 1;
    let pow2 = 1_u64.checked_shl(exp).unwrap_or(u64::MAX);
    let delay = self.base_delay_ms.saturating_mul(pow2).min(self.max_delay_ms);

    let jitter_range = delay as f64 * self.jitter_pct;
    let jitter = if jitter_range > 0.0 {
      rng.gen_range(-jitter_range..=jitter_range)
    } else {
      0.0
    };

    let jittered = (delay as f64 + jitter).round().clamp(0.0, self.max_delay_ms as f64);
    Duration::from_millis(jittered as u64)
  }
}

/// Runs `operation` until it succeeds, `is_retryable` rejects the error, or
/// the attempts run out. The last error is returned.
pub async fn retry<T, E, F, Fut>(
  policy: &RetryPolicy,
  what: &str,
  is_retryable: impl Fn(&E) -> bool,
  mut operation: F,
) -> Result<T, E>
where
  E: std::fmt::Display,
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, E>>,
{
  let mut attempt = 1;
  loop {
    match operation().await {
      Ok(value) => return Ok(value),
      Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
        let delay = policy.delay_for(attempt, &mut rand::thread_rng());
        tracing::warn!(
          "{} failed (attempt {}/{}): {}; retrying in {:?}",
          what,
          attempt,
          policy.max_attempts,
          e,
          delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
      Err(e) => return Err(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::SeedableRng;
  use rand::rngs::StdRng;
  use std::sync::atomic::{AtomicU32, Ordering};

  fn no_jitter() -> RetryPolicy {
    RetryPolicy {
      max_attempts: 4,
      base_delay_ms: 100,
      max_delay_ms: 500,
      jitter_pct: 0.0,
    }
  }

  #[test]
  fn test_delay_doubles_and_caps() {
    let policy = no_jitter();
    let mut rng = StdRng::seed_from_u64(7);
    let delays: Vec<u64> = (1..=5)
      .map(|n| policy.delay_for(n, &mut rng).as_millis() as u64)
      .collect();
    assert_eq!(delays, vec![100, 200, 400, 500, 500]);
  }

  #[test]
  fn test_jitter_stays_in_range() {
    let policy = RetryPolicy {
      jitter_pct: 0.2,
      ..no_jitter()
    };
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
      let delay = policy.delay_for(2, &mut rng).as_millis() as u64;
      assert!((160..=240).contains(&delay), "delay {delay} out of range");
    }
  }

  fn fast() -> RetryPolicy {
    RetryPolicy {
      max_attempts: 4,
      base_delay_ms: 1,
      max_delay_ms: 5,
      jitter_pct: 0.0,
    }
  }

  #[tokio::test]
  async fn test_retry_stops_on_success() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result: Result<u32, String> = retry(&fast(), "flaky call", |_| true, move || async move {
      let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
      if n < 3 { Err(format!("attempt {n}")) } else { Ok(n) }
    })
    .await;
    assert_eq!(result, Ok(3));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_retry_gives_up_on_permanent_errors() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result: Result<(), String> = retry(&fast(), "bad call", |_| false, move || async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Err("rejected".to_string())
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let calls = AtomicU32::new(0);
    let counter = &calls;
    let result: Result<(), String> = retry(&fast(), "down", |_| true, move || async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Err("unavailable".to_string())
    })
    .await;
    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
  }
}
