//! Simulated test execution.
//!
//! Runs do not execute steps. They wait a random time and report a random
//! terminal status, weighted by the configured pass rate. Cancelling a run
//! once started is not supported.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::RunnerConfig;
use crate::test_case::{RunStatus, TestCase};

/// Executes test cases and reports how they finished.
///
/// Every future resolves to a terminal status ([`RunStatus::Passed`] or
/// [`RunStatus::Failed`]).
#[async_trait]
pub trait TestRunner: Send + Sync {
    /// Runs one case.
    async fn run(&self, case: &TestCase) -> RunStatus;

    /// Runs a suite's cases together; one status per case, in order.
    async fn run_suite(&self, cases: &[TestCase]) -> Vec<RunStatus>;
}

/// Runner that flips a weighted coin after a random delay.
pub struct SimulatedRunner {
    config: RunnerConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a runner whose outcomes are reproducible.
    pub fn with_rng_seed(config: RunnerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw_delay(rng: &mut StdRng, min_ms: u64, max_ms: u64) -> Duration {
        let ms = if max_ms > min_ms {
            rng.gen_range(min_ms..=max_ms)
        } else {
            min_ms
        };
        Duration::from_millis(ms)
    }

    fn draw_status(rng: &mut StdRng, pass_rate: f64) -> RunStatus {
        let pass_rate = if pass_rate.is_nan() {
            0.0
        } else {
            pass_rate.clamp(0.0, 1.0)
        };
        if rng.gen_bool(pass_rate) {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        }
    }
}

#[async_trait]
impl TestRunner for SimulatedRunner {
    async fn run(&self, case: &TestCase) -> RunStatus {
        let (delay, status) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let delay =
                Self::draw_delay(&mut rng, self.config.min_delay_ms, self.config.max_delay_ms);
            (delay, Self::draw_status(&mut rng, self.config.pass_rate))
        };

        debug!(id = %case.id, ?delay, "Running test case");
        tokio::time::sleep(delay).await;
        status
    }

    async fn run_suite(&self, cases: &[TestCase]) -> Vec<RunStatus> {
        let (delay, statuses) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let delay = Self::draw_delay(
                &mut rng,
                self.config.suite_min_delay_ms,
                self.config.suite_max_delay_ms,
            );
            let statuses: Vec<RunStatus> = cases
                .iter()
                .map(|_| Self::draw_status(&mut rng, self.config.suite_pass_rate))
                .collect();
            (delay, statuses)
        };

        debug!(cases = cases.len(), ?delay, "Running suite");
        tokio::time::sleep(delay).await;
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_case::{NewTestCase, TestType};

    fn instant(pass_rate: f64) -> RunnerConfig {
        RunnerConfig {
            pass_rate,
            suite_pass_rate: pass_rate,
            min_delay_ms: 0,
            max_delay_ms: 0,
            suite_min_delay_ms: 0,
            suite_max_delay_ms: 0,
        }
    }

    fn case() -> TestCase {
        TestCase::from_new("tc-1", NewTestCase::new("Smoke", TestType::Ui))
    }

    #[tokio::test]
    async fn test_certain_outcomes() {
        let always = SimulatedRunner::with_rng_seed(instant(1.0), 7);
        assert_eq!(always.run(&case()).await, RunStatus::Passed);

        let never = SimulatedRunner::with_rng_seed(instant(0.0), 7);
        assert_eq!(never.run(&case()).await, RunStatus::Failed);
    }

    #[tokio::test]
    async fn test_suite_reports_one_status_per_case() {
        let runner = SimulatedRunner::with_rng_seed(instant(0.5), 42);
        let cases = vec![case(), case(), case()];
        let statuses = runner.run_suite(&cases).await;
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|s| s.is_terminal()));
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let a = SimulatedRunner::with_rng_seed(instant(0.5), 99);
        let b = SimulatedRunner::with_rng_seed(instant(0.5), 99);
        let cases = vec![case(); 8];
        assert_eq!(a.run_suite(&cases).await, b.run_suite(&cases).await);
    }

    #[test]
    fn test_delay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let delay = SimulatedRunner::draw_delay(&mut rng, 1000, 3000);
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(3000));
        }
        assert_eq!(
            SimulatedRunner::draw_delay(&mut rng, 500, 100),
            Duration::from_millis(500)
        );
    }
}
