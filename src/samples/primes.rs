use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;

/// Candidates tested between two yields to the runtime.
const YIELD_EVERY: u32 = 1024;

use crate::error::JobError;
use crate::jobs::{Job, JobRef, JobState};

/// Computes every prime up to a limit.
///
/// Meant to be required by [`PrimeCheckJob`]s, so it is never auto-retired:
/// remove it once its checkers are gone.
pub struct PrimeCalcJob {
    name: String,
    state: JobState,
    limit: u32,
    primes: RwLock<Vec<u32>>,
}

impl PrimeCalcJob {
    pub fn new(name: impl Into<String>, planned: Instant, limit: u32) -> Self {
        Self {
            name: name.into(),
            state: JobState::new(Some(planned)),
            limit,
            primes: RwLock::new(Vec::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Primes found so far (all of them once the job finished).
    pub fn primes(&self) -> Vec<u32> {
        self.primes.read().clone()
    }
}

#[async_trait]
impl Job for PrimeCalcJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        let mut found: Vec<u32> = Vec::new();
        if self.limit >= 2 {
            found.push(2);
        }
        let mut candidate: u32 = 3;
        let mut tested: u32 = 0;
        while candidate <= self.limit {
            tested += 1;
            if tested % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
            let c = u64::from(candidate);
            let composite = found
                .iter()
                .map(|&p| u64::from(p))
                .take_while(|p| p * p <= c)
                .any(|p| c % p == 0);
            if !composite {
                found.push(candidate);
            }
            candidate = match candidate.checked_add(2) {
                Some(next) => next,
                None => break,
            };
        }
        *self.primes.write() = found;
        Ok(())
    }

    fn auto_retire(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        format!(
            "Prime calculator: {} primes up to {}",
            self.primes.read().len(),
            self.limit
        )
    }
}

/// Outcome of a [`PrimeCheckJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimeCheck {
    Prime,
    NotPrime,
    /// Not decided yet, or the calculator's limit is too small to decide.
    Unknown,
}

/// Classifies one number using the primes of a [`PrimeCalcJob`] it requires.
pub struct PrimeCheckJob {
    name: String,
    state: JobState,
    calc: Arc<PrimeCalcJob>,
    number: u32,
    result: Mutex<PrimeCheck>,
}

impl PrimeCheckJob {
    pub fn new(name: impl Into<String>, planned: Instant, calc: Arc<PrimeCalcJob>, number: u32) -> Self {
        let required: Vec<JobRef> = vec![calc.clone()];
        Self {
            name: name.into(),
            state: JobState::with_required(Some(planned), required),
            calc,
            number,
            result: Mutex::new(PrimeCheck::Unknown),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn result(&self) -> PrimeCheck {
        *self.result.lock()
    }
}

/// Decides `number` from every prime up to `limit`.
///
/// Without a dividing prime, `number` is prime as long as `(limit + 1)^2 > number`.
fn classify(number: u32, primes: &[u32], limit: u32) -> PrimeCheck {
    if number < 2 {
        return PrimeCheck::NotPrime;
    }
    let n = u64::from(number);
    for &p in primes {
        let p = u64::from(p);
        if p * p > n {
            return PrimeCheck::Prime;
        }
        if n % p == 0 {
            return if n == p {
                PrimeCheck::Prime
            } else {
                PrimeCheck::NotPrime
            };
        }
    }
    let bound = u64::from(limit) + 1;
    if bound * bound > n {
        PrimeCheck::Prime
    } else {
        PrimeCheck::Unknown
    }
}

#[async_trait]
impl Job for PrimeCheckJob {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        let verdict = classify(self.number, &self.calc.primes(), self.calc.limit());
        *self.result.lock() = verdict;
        Ok(())
    }

    fn describe(&self) -> String {
        let verdict = match self.result() {
            PrimeCheck::Prime => "prime",
            PrimeCheck::NotPrime => "not prime",
            PrimeCheck::Unknown => "unknown",
        };
        format!("Prime checker: {} is {verdict}", self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JobId, JobObserver, PROGRESS_FINISHED, PROGRESS_STARTED};

    #[tokio::test]
    async fn sieve_up_to_thirty() {
        let calc = PrimeCalcJob::new("calc", Instant::now(), 30);
        calc.run().await.expect("run");
        assert_eq!(calc.primes(), vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(!calc.auto_retire());
        assert_eq!(calc.describe(), "Prime calculator: 10 primes up to 30");
    }

    #[test]
    fn classify_edge_cases() {
        let primes = [2, 3, 5, 7];
        assert_eq!(classify(0, &primes, 10), PrimeCheck::NotPrime);
        assert_eq!(classify(1, &primes, 10), PrimeCheck::NotPrime);
        assert_eq!(classify(2, &primes, 10), PrimeCheck::Prime);
        assert_eq!(classify(49, &primes, 10), PrimeCheck::NotPrime);
        assert_eq!(classify(47, &primes, 10), PrimeCheck::Prime);
        assert_eq!(classify(53, &primes, 10), PrimeCheck::Prime);
        assert_eq!(classify(113, &primes, 10), PrimeCheck::Prime);
        assert_eq!(classify(119, &primes, 10), PrimeCheck::NotPrime);
        // Needs 11 to decide.
        assert_eq!(classify(121, &primes, 10), PrimeCheck::Unknown);
        assert_eq!(classify(3, &[], 1), PrimeCheck::Prime);
    }

    #[derive(Default)]
    struct ProgressLog(Mutex<Vec<i32>>);

    impl JobObserver for ProgressLog {
        fn on_progress(&self, _job: JobId, progress: i32) {
            self.0.lock().push(progress);
        }
        fn on_ready(&self, _job: JobId, _ready: bool) {}
    }

    #[tokio::test]
    async fn checker_uses_calculator_limit() {
        let calc = Arc::new(PrimeCalcJob::new("calc", Instant::now(), 10));
        calc.run().await.expect("run");
        let check = PrimeCheckJob::new("check", Instant::now(), calc.clone(), 53);
        let log = Arc::new(ProgressLog::default());
        let observer: Arc<dyn JobObserver> = log.clone();
        assert!(check.add_observer(&observer));

        check.before_run();
        check.run().await.expect("run");
        check.after_run();
        assert_eq!(check.result(), PrimeCheck::Prime);
        assert_eq!(*log.0.lock(), vec![PROGRESS_STARTED, PROGRESS_FINISHED]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn large_sieve_lets_other_tasks_run() {
        let calc = Arc::new(PrimeCalcJob::new("calc", Instant::now(), 200_000));
        let ticks = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = ticks.clone();
        let ticker = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                tokio::task::yield_now().await;
            }
        });

        calc.run().await.expect("run");
        ticker.abort();
        assert!(ticks.load(std::sync::atomic::Ordering::SeqCst) > 1);
        assert_eq!(calc.primes().len(), 17_984);
    }
}
