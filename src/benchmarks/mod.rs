//! Repeated timing and allocation measurement of an operation
//!
//! The runner executes an operation a fixed number of times or until a wall-clock budget is
//! spent, and records elapsed time and allocated bytes of every repetition. Allocation figures
//! need the [`alloc::CountingAllocator`] to be registered as global allocator.

pub mod alloc;

use std::time::{Duration, Instant};

use linfa::ParamGuard;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use self::alloc::AllocSnapshot;

/// How often an operation is repeated
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Exactly this many repetitions
    Repetitions(usize),
    /// Repeat until `min_time` of accumulated run time is spent, at most `max_repetitions` times
    Time {
        min_time: Duration,
        max_repetitions: usize,
    },
}

/// Checked benchmark configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkValidParams {
    budget: Budget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkParams(BenchmarkValidParams);

impl BenchmarkParams {
    /// Five repetitions by default
    pub fn new() -> Self {
        BenchmarkParams(BenchmarkValidParams {
            budget: Budget::Repetitions(5),
        })
    }

    pub fn budget(mut self, budget: Budget) -> Self {
        self.0.budget = budget;
        self
    }

    pub fn repetitions(self, repetitions: usize) -> Self {
        self.budget(Budget::Repetitions(repetitions))
    }

    pub fn time_budget(self, min_time: Duration, max_repetitions: usize) -> Self {
        self.budget(Budget::Time {
            min_time,
            max_repetitions,
        })
    }
}

impl Default for BenchmarkParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for BenchmarkParams {
    type Checked = BenchmarkValidParams;
    type Error = BenchError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        match self.0.budget {
            Budget::Repetitions(0) => Err(BenchError::InvalidArgument(
                "at least one repetition is required".into(),
            )),
            Budget::Time { min_time, .. } if min_time.is_zero() => Err(
                BenchError::InvalidArgument("time budget must be positive".into()),
            ),
            Budget::Time {
                max_repetitions: 0, ..
            } => Err(BenchError::InvalidArgument(
                "at least one repetition is required".into(),
            )),
            _ => Ok(&self.0),
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Measurements of a benchmarked operation
///
/// `elapsed` and `allocated` hold one entry per repetition, `output` is the value returned by
/// the last repetition.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult<T> {
    pub elapsed: Vec<Duration>,
    pub allocated: Vec<u64>,
    pub output: T,
}

impl<T> BenchmarkResult<T> {
    pub fn repetitions(&self) -> usize {
        self.elapsed.len()
    }

    /// Median elapsed time
    pub fn median(&self) -> Duration {
        median(&self.elapsed)
    }

    pub fn median_secs(&self) -> f64 {
        self.median().as_secs_f64()
    }

    /// Median of the bytes allocated per repetition
    pub fn allocated_bytes(&self) -> u64 {
        let mut sorted = self.allocated.clone();
        sorted.sort_unstable();

        match sorted.len() {
            0 => 0,
            n if n % 2 == 1 => sorted[n / 2],
            n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2,
        }
    }

    /// Drop the measurements and keep the output
    pub fn into_output(self) -> T {
        self.output
    }
}

/// Median of a set of durations
///
/// The mean of both middle values for an even count, zero for an empty slice.
pub fn median(samples: &[Duration]) -> Duration {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    match sorted.len() {
        0 => Duration::ZERO,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2,
    }
}

impl BenchmarkValidParams {
    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Run `op` according to the budget
    ///
    /// The operation has to be repeatable, its first error aborts the benchmark.
    pub fn run<T, E, Op>(&self, mut op: Op) -> std::result::Result<BenchmarkResult<T>, E>
    where
        Op: FnMut() -> std::result::Result<T, E>,
    {
        let (min_time, max_repetitions) = match self.budget {
            Budget::Repetitions(n) => (None, n.max(1)),
            Budget::Time {
                min_time,
                max_repetitions,
            } => (Some(min_time), max_repetitions.max(1)),
        };

        let mut elapsed = Vec::new();
        let mut allocated = Vec::new();
        let mut spent = Duration::ZERO;

        loop {
            let before = AllocSnapshot::now();
            let start = Instant::now();
            let output = op()?;
            let time = start.elapsed();
            let alloc = before.since();

            debug!(
                repetition = elapsed.len(),
                ?time,
                bytes = alloc.bytes,
                "benchmark repetition"
            );

            spent += time;
            elapsed.push(time);
            allocated.push(alloc.bytes);

            let done = match min_time {
                None => elapsed.len() >= max_repetitions,
                Some(min_time) if spent >= min_time => true,
                Some(min_time) if elapsed.len() >= max_repetitions => {
                    warn!(
                        repetitions = elapsed.len(),
                        ?spent,
                        ?min_time,
                        "repetition limit reached before the time budget was spent"
                    );
                    true
                }
                Some(_) => false,
            };

            if done {
                return Ok(BenchmarkResult {
                    elapsed,
                    allocated,
                    output,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{median, BenchmarkParams, BenchmarkResult};
    use crate::error::BenchError;
    use linfa::ParamGuard;
    use std::time::Duration;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn median_of_odd_and_even_counts() {
        assert_eq!(median(&[ms(5), ms(1), ms(9), ms(3), ms(7)]), ms(5));
        assert_eq!(median(&[ms(4), ms(1), ms(2), ms(8)]), ms(3));
        assert_eq!(median(&[]), Duration::ZERO);
    }

    #[test]
    fn fixed_repetitions_call_operation_exactly() {
        let mut calls = 0;
        let result = BenchmarkParams::new()
            .repetitions(5)
            .check()
            .unwrap()
            .run(|| {
                calls += 1;
                Ok::<_, BenchError>(calls)
            })
            .unwrap();

        assert_eq!(calls, 5);
        assert_eq!(result.repetitions(), 5);
        assert_eq!(result.allocated.len(), 5);
        assert_eq!(result.output, 5);
    }

    #[test]
    fn reports_middle_of_five() {
        let result = BenchmarkResult {
            elapsed: vec![ms(30), ms(10), ms(50), ms(20), ms(40)],
            allocated: vec![7, 3, 5, 1, 9],
            output: (),
        };

        assert_eq!(result.median(), ms(30));
        assert_eq!(result.median_secs(), 0.03);
        assert_eq!(result.allocated_bytes(), 5);
    }

    #[test]
    fn time_budget_stops_at_repetition_limit() {
        let result = BenchmarkParams::new()
            .time_budget(Duration::from_secs(3600), 3)
            .check()
            .unwrap()
            .run(|| Ok::<_, BenchError>(()))
            .unwrap();

        assert_eq!(result.repetitions(), 3);
    }

    #[test]
    fn time_budget_stops_when_spent() {
        let result = BenchmarkParams::new()
            .time_budget(Duration::from_millis(1), 1000)
            .check()
            .unwrap()
            .run(|| {
                std::thread::sleep(ms(2));
                Ok::<_, BenchError>(())
            })
            .unwrap();

        assert_eq!(result.repetitions(), 1);
    }

    #[test]
    fn first_error_aborts() {
        let mut calls = 0;
        let res = BenchmarkParams::new()
            .check()
            .unwrap()
            .run(|| {
                calls += 1;
                if calls == 2 {
                    Err(BenchError::InvalidArgument("boom".into()))
                } else {
                    Ok(())
                }
            });

        assert!(res.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn invalid_budgets_are_rejected() {
        for params in [
            BenchmarkParams::new().repetitions(0),
            BenchmarkParams::new().time_budget(Duration::ZERO, 10),
            BenchmarkParams::new().time_budget(ms(10), 0),
        ] {
            assert!(matches!(
                params.check(),
                Err(BenchError::InvalidArgument(_))
            ));
        }
    }
}
