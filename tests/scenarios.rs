use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jobvisor::samples::{AlternatingJob, OneShotJob, PeriodicJob, PrimeCalcJob, PrimeCheck, PrimeCheckJob};
use jobvisor::{
    Event, EventKind, Job, JobError, JobRef, JobState, JobStatus, RuntimeError, ScheduleError,
    Scheduler, SchedulerConfig,
};
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

fn scheduler() -> Arc<Scheduler> {
    Scheduler::builder(SchedulerConfig::default()).build()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_immediate_one_shot_is_retired() {
    let sched = scheduler();
    let job = Arc::new(OneShotJob::new("now", Some(Instant::now()), Vec::new()));

    assert!(sched.register(job.clone()).unwrap());
    time::sleep(ms(10)).await;

    assert!(job.is_completed());
    assert!(job.is_finished());
    assert!(!sched.contains(job.as_ref()));
    assert!(sched.scheduled_jobs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_one_shot() {
    let sched = scheduler();
    let start = Instant::now();
    let job = Arc::new(OneShotJob::new("later", Some(start + ms(1000)), Vec::new()));
    assert!(sched.register(job.clone()).unwrap());

    time::sleep_until(start + ms(10)).await;
    assert!(!job.is_completed());
    assert!(!job.is_started());
    assert_eq!(sched.status(job.as_ref()), Some(JobStatus::PendingTime));
    assert_eq!(sched.scheduled_jobs().len(), 1);

    time::sleep_until(start + ms(1500)).await;
    assert!(job.is_completed());
    assert!(!sched.contains(job.as_ref()));
}

#[tokio::test(start_paused = true)]
async fn test_dependency_chain_orders_runs() {
    let sched = scheduler();
    let mut rx = sched.events();
    let start = Instant::now();

    let a = Arc::new(OneShotJob::new("a", Some(start), Vec::new()).with_work(ms(100)));
    let required: Vec<JobRef> = vec![a.clone()];
    let b = Arc::new(OneShotJob::new("b", Some(start), required));
    assert!(sched.register(a.clone()).unwrap());
    assert!(sched.register(b.clone()).unwrap());

    time::sleep_until(start + ms(50)).await;
    assert_eq!(sched.status(a.as_ref()), Some(JobStatus::Running));
    assert_eq!(sched.status(b.as_ref()), Some(JobStatus::Checking));
    assert!(!b.is_started());

    time::sleep_until(start + ms(200)).await;
    assert!(a.is_completed() && b.is_completed());
    let a_done = a.finished_at().unwrap();
    let b_start = b.started_at().unwrap();
    assert!(a_done <= b_start);

    // `a` will not run again but had a successor when it finished: it stays
    // registered until removed.
    assert!(!sched.contains(b.as_ref()));
    assert_eq!(sched.status(a.as_ref()), Some(JobStatus::Finished));
    let kept = drain(&mut rx)
        .into_iter()
        .find(|ev| ev.kind == EventKind::JobKept)
        .unwrap();
    assert_eq!(kept.job.as_deref(), Some("a"));
    assert_eq!(kept.reason.as_deref(), Some("has_successors"));

    assert!(sched.unregister(a.as_ref()).unwrap());
    assert!(sched.scheduled_jobs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_periodic_launch_counts() {
    let sched = scheduler();
    let start = Instant::now();
    let job = Arc::new(PeriodicJob::new("tick", start + ms(500), ms(500), ms(500)));
    assert!(sched.register(job.clone()).unwrap());

    time::sleep_until(start + ms(1250)).await;
    assert_eq!(job.launches(), 1);

    time::sleep_until(start + ms(3250)).await;
    assert_eq!(job.launches(), 3);
    assert!(sched.contains(job.as_ref()));
    assert_eq!(sched.runs(job.as_ref()), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_registration_rejection() {
    let sched = scheduler();

    let never = Arc::new(OneShotJob::new("never", None, Vec::new()));
    let err = sched.register(never.clone()).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidSchedule { .. }));

    let orphan_parent = Arc::new(OneShotJob::new("parent", Some(Instant::now()), Vec::new()));
    let required: Vec<JobRef> = vec![orphan_parent.clone()];
    let orphan = Arc::new(OneShotJob::new("orphan", Some(Instant::now()), required));
    let err = sched.register(orphan.clone()).unwrap_err();
    assert_eq!(err.as_label(), "invalid_schedule");
    assert!(err.to_string().contains("parent"));
    assert!(!sched.contains(orphan.as_ref()));
    assert!(sched.scheduled_jobs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_registration() {
    let sched = scheduler();
    let job = Arc::new(OneShotJob::new("dup", Some(Instant::now() + ms(1000)), Vec::new()));

    assert!(sched.register(job.clone()).unwrap());
    assert!(!sched.register(job.clone()).unwrap());
    assert_eq!(sched.scheduled_jobs().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_removal_guards() {
    let sched = scheduler();
    let start = Instant::now();

    let a = Arc::new(OneShotJob::new("a", Some(start), Vec::new()).with_work(ms(1000)));
    let required: Vec<JobRef> = vec![a.clone()];
    let b = Arc::new(OneShotJob::new("b", Some(start + Duration::from_secs(3600)), required));
    assert!(sched.register(a.clone()).unwrap());
    assert!(sched.register(b.clone()).unwrap());

    time::sleep_until(start + ms(10)).await;
    let err = sched.unregister(a.as_ref()).unwrap_err();
    assert_eq!(err, ScheduleError::JobBusy { job: "a".into() });

    time::sleep_until(start + ms(1100)).await;
    let err = sched.unregister(a.as_ref()).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::JobRequired {
            job: "a".into(),
            successors: vec!["b".into()],
        }
    );

    assert!(sched.unregister(b.as_ref()).unwrap());
    assert!(sched.unregister(a.as_ref()).unwrap());
    assert!(!sched.unregister(a.as_ref()).unwrap());
    assert!(sched.scheduled_jobs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unregistered_job_never_starts() {
    let sched = scheduler();
    let start = Instant::now();
    let job = Arc::new(OneShotJob::new("cancelled", Some(start + ms(100)), Vec::new()));
    assert!(sched.register(job.clone()).unwrap());

    assert!(sched.unregister(job.as_ref()).unwrap());
    time::sleep_until(start + ms(500)).await;
    assert!(!job.is_started());
    assert!(!job.is_completed());
}

#[tokio::test(start_paused = true)]
async fn test_readiness_wakes_checking_job() {
    let sched = scheduler();
    let job = Arc::new(
        OneShotJob::new("gated", Some(Instant::now()), Vec::new()).with_ready(false),
    );
    assert!(sched.register(job.clone()).unwrap());

    time::sleep(ms(50)).await;
    assert_eq!(sched.status(job.as_ref()), Some(JobStatus::Checking));
    assert!(!job.is_completed());

    job.state().set_ready(true);
    time::sleep(ms(10)).await;
    assert!(job.is_completed());
    assert!(!sched.contains(job.as_ref()));
}

/// Recurring job that records how many of its bodies overlap.
struct Overlap {
    state: JobState,
    active: AtomicUsize,
    peak: AtomicUsize,
    runs: AtomicUsize,
    limit: usize,
    work: Duration,
}

impl Overlap {
    fn new(limit: usize, work: Duration) -> Self {
        Self {
            state: JobState::new(Some(Instant::now())),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            runs: AtomicUsize::new(0),
            limit,
            work,
        }
    }
}

#[async_trait]
impl Job for Overlap {
    fn name(&self) -> &str {
        "overlap"
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        time::sleep(self.work).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn after_run(&self) {
        self.state.set_progress(self.max_progress());
        let next = (self.runs.load(Ordering::SeqCst) < self.limit).then(Instant::now);
        self.state.set_planned_time(next);
    }
}

#[tokio::test(start_paused = true)]
async fn test_at_most_one_execution() {
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 0;
    let sched = Scheduler::builder(cfg).build();

    let job = Arc::new(Overlap::new(20, ms(5)));
    assert!(sched.register(job.clone()).unwrap());

    let poker = job.clone();
    let wakeups = tokio::spawn(async move {
        for i in 0..400 {
            poker.state().set_ready(i % 7 != 0);
            poker.state().set_ready(true);
            time::sleep(Duration::from_micros(500)).await;
        }
    });

    time::sleep(Duration::from_secs(1)).await;
    wakeups.await.unwrap();

    assert_eq!(job.peak.load(Ordering::SeqCst), 1);
    assert_eq!(job.runs.load(Ordering::SeqCst), 20);
    assert!(!sched.contains(job.as_ref()));
}

#[tokio::test(start_paused = true)]
async fn test_ping_pong_pair_takes_turns() {
    let sched = scheduler();
    let (ping, pong) = AlternatingJob::pair("ping", "pong", Instant::now(), ms(100));
    assert!(sched.register(ping.clone()).unwrap());
    assert!(sched.register(pong.clone()).unwrap());

    time::sleep(ms(1000)).await;
    assert!(ping.launches() >= 2);
    assert!(pong.launches() >= 2);
    assert!(sched.contains(ping.as_ref()) && sched.contains(pong.as_ref()));

    sched.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_prime_checks_wait_for_calculator() {
    let sched = scheduler();
    let start = Instant::now();
    let calc = Arc::new(PrimeCalcJob::new("calc", start, 1000));
    let prime = Arc::new(PrimeCheckJob::new("check-997", start, calc.clone(), 997));
    let composite = Arc::new(PrimeCheckJob::new("check-999", start, calc.clone(), 999));

    assert!(sched.register(calc.clone()).unwrap());
    assert!(sched.register(prime.clone()).unwrap());
    assert!(sched.register(composite.clone()).unwrap());

    time::sleep(ms(100)).await;
    assert_eq!(prime.result(), PrimeCheck::Prime);
    assert_eq!(composite.result(), PrimeCheck::NotPrime);
    assert_eq!(prime.describe(), "Prime checker: 997 is prime");

    assert!(!sched.contains(prime.as_ref()));
    assert!(!sched.contains(composite.as_ref()));
    assert_eq!(sched.status(calc.as_ref()), Some(JobStatus::Finished));
    assert_eq!(sched.job_progress(calc.as_ref()), Some(jobvisor::PROGRESS_FINISHED));

    assert!(sched.unregister(calc.as_ref()).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_periodic_prerequisite_keeps_successors() {
    let sched = scheduler();
    let start = Instant::now();
    let a = Arc::new(PeriodicJob::new("a", start, ms(10), ms(1000)));
    let required: Vec<JobRef> = vec![a.clone()];
    let b = Arc::new(OneShotJob::new("b", Some(start + ms(50)), required));
    assert!(sched.register(a.clone()).unwrap());
    assert!(sched.register(b.clone()).unwrap());

    time::sleep_until(start + ms(100)).await;
    assert_eq!(sched.status(a.as_ref()), Some(JobStatus::PendingTime));
    assert_eq!(sched.status(b.as_ref()), Some(JobStatus::Checking));
    assert!(matches!(
        sched.unregister(a.as_ref()),
        Err(ScheduleError::JobRequired { .. })
    ));

    time::sleep_until(start + ms(1100)).await;
    assert_eq!(a.launches(), 2);
    assert!(b.is_completed());
    assert!(!sched.contains(b.as_ref()));
    assert!(sched.unregister(a.as_ref()).unwrap());
}

/// Job whose body fails, either with an error or a panic.
struct Faulty {
    name: &'static str,
    state: JobState,
    panics: bool,
}

#[async_trait]
impl Job for Faulty {
    fn name(&self) -> &str {
        self.name
    }

    fn state(&self) -> &JobState {
        &self.state
    }

    async fn run(&self) -> Result<(), JobError> {
        if self.panics {
            panic!("boom");
        }
        Err(JobError::fail("disk full"))
    }
}

#[tokio::test(start_paused = true)]
async fn test_failed_bodies_still_complete() {
    let sched = scheduler();
    let mut rx = sched.events();
    let failing = Arc::new(Faulty {
        name: "failing",
        state: JobState::new(Some(Instant::now())),
        panics: false,
    });
    let panicking = Arc::new(Faulty {
        name: "panicking",
        state: JobState::new(Some(Instant::now())),
        panics: true,
    });
    assert!(sched.register(failing.clone()).unwrap());
    assert!(sched.register(panicking.clone()).unwrap());

    time::sleep(ms(10)).await;
    assert!(failing.is_finished() && panicking.is_finished());
    assert!(sched.scheduled_jobs().is_empty());

    let events = drain(&mut rx);
    let reasons: Vec<String> = events
        .iter()
        .filter(|ev| ev.kind == EventKind::JobFailed)
        .filter_map(|ev| ev.reason.as_deref().map(str::to_string))
        .collect();
    assert_eq!(reasons.len(), 2);
    assert!(reasons.iter().any(|r| r.contains("disk full")));
    assert!(reasons.iter().any(|r| r.contains("boom")));
    assert_eq!(
        events.iter().filter(|ev| ev.kind == EventKind::JobRetired).count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_grace_exceeded_and_closed() {
    let mut cfg = SchedulerConfig::default();
    cfg.grace = ms(100);
    let sched = Scheduler::builder(cfg).build();

    let slow = Arc::new(
        OneShotJob::new("slow", Some(Instant::now()), Vec::new())
            .with_work(Duration::from_secs(10)),
    );
    assert!(sched.register(slow.clone()).unwrap());
    time::sleep(ms(10)).await;

    match sched.shutdown().await {
        Err(RuntimeError::GraceExceeded { grace, stuck }) => {
            assert_eq!(grace, ms(100));
            assert_eq!(stuck, vec!["slow".to_string()]);
        }
        other => panic!("unexpected shutdown result: {other:?}"),
    }

    assert!(sched.is_closed());
    let late = Arc::new(OneShotJob::new("late", Some(Instant::now()), Vec::new()));
    assert_eq!(sched.register(late).unwrap_err(), ScheduleError::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_triggers() {
    let sched = scheduler();
    let start = Instant::now();
    let job = Arc::new(OneShotJob::new("pending", Some(start + ms(100)), Vec::new()));
    assert!(sched.register(job.clone()).unwrap());

    sched.shutdown().await.unwrap();
    time::sleep_until(start + ms(500)).await;
    assert!(!job.is_started());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_at_most_one_execution_across_threads() {
    let mut cfg = SchedulerConfig::default();
    cfg.max_workers = 0;
    let sched = Scheduler::builder(cfg).build();

    let job = Arc::new(Overlap::new(200, Duration::from_micros(200)));
    assert!(sched.register(job.clone()).unwrap());

    let stop = Arc::new(AtomicBool::new(false));
    let pokers: Vec<_> = (0..4)
        .map(|_| {
            let (job, stop) = (job.clone(), stop.clone());
            tokio::spawn(async move {
                while !stop.load(Ordering::SeqCst) {
                    job.state().set_ready(true);
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    let retired = time::timeout(Duration::from_secs(20), async {
        while sched.contains(job.as_ref()) {
            time::sleep(ms(1)).await;
        }
    })
    .await;
    stop.store(true, Ordering::SeqCst);
    for poker in pokers {
        poker.await.unwrap();
    }

    assert!(retired.is_ok(), "job did not complete its runs");
    assert_eq!(job.peak.load(Ordering::SeqCst), 1);
    assert_eq!(job.runs.load(Ordering::SeqCst), 200);
}

#[tokio::test(start_paused = true)]
async fn test_no_auto_retire_keeps_finished_job() {
    let sched = scheduler();
    let mut rx = sched.events();
    let calc = Arc::new(PrimeCalcJob::new("calc", Instant::now(), 100));
    assert!(sched.register(calc.clone()).unwrap());

    time::sleep(ms(10)).await;
    assert_eq!(calc.primes().len(), 25);
    assert_eq!(sched.status(calc.as_ref()), Some(JobStatus::Finished));

    let kept = drain(&mut rx)
        .into_iter()
        .find(|ev| ev.kind == EventKind::JobKept)
        .unwrap();
    assert_eq!(kept.job.as_deref(), Some("calc"));
    assert_eq!(kept.reason.as_deref(), Some("auto_retire_disabled"));

    // Stays until removed.
    time::sleep(ms(1000)).await;
    assert!(sched.contains(calc.as_ref()));
    assert!(sched.unregister(calc.as_ref()).unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_job_waiting_for_worker_is_busy() {
    let sched = scheduler();
    let start = Instant::now();
    let long = Arc::new(OneShotJob::new("long", Some(start), Vec::new()).with_work(ms(1000)));
    let queued = Arc::new(OneShotJob::new("queued", Some(start), Vec::new()));
    assert!(sched.register(long.clone()).unwrap());
    assert!(sched.register(queued.clone()).unwrap());

    time::sleep_until(start + ms(10)).await;
    assert_eq!(sched.status(long.as_ref()), Some(JobStatus::Running));
    assert_eq!(sched.status(queued.as_ref()), Some(JobStatus::Running));
    assert!(!queued.is_started());
    assert_eq!(
        sched.unregister(queued.as_ref()).unwrap_err(),
        ScheduleError::JobBusy { job: "queued".into() }
    );

    time::sleep_until(start + ms(1100)).await;
    assert!(long.is_completed() && queued.is_completed());
    assert!(queued.started_at().unwrap() >= long.finished_at().unwrap());
    assert!(sched.scheduled_jobs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reregistered_job_is_woken_by_readiness() {
    let sched = scheduler();
    let job = Arc::new(
        OneShotJob::new("gated", Some(Instant::now() + ms(50)), Vec::new()).with_ready(false),
    );
    assert!(sched.register(job.clone()).unwrap());
    assert!(sched.unregister(job.as_ref()).unwrap());
    assert!(sched.register(job.clone()).unwrap());

    time::sleep(ms(100)).await;
    assert_eq!(sched.status(job.as_ref()), Some(JobStatus::Checking));

    job.state().set_ready(true);
    time::sleep(ms(10)).await;
    assert!(job.is_completed());
    assert!(!sched.contains(job.as_ref()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_racing_reregistration_keeps_observer() {
    let sched = scheduler();
    let job = Arc::new(OneShotJob::new(
        "flip",
        Some(Instant::now() + Duration::from_secs(3600)),
        Vec::new(),
    ));
    assert!(sched.register(job.clone()).unwrap());

    for i in 0..500 {
        let (remover_sched, remover_job) = (sched.clone(), job.clone());
        let remover = tokio::spawn(async move { remover_sched.unregister(remover_job.as_ref()) });
        while !sched.register(job.clone()).unwrap() {
            tokio::task::yield_now().await;
        }
        assert!(remover.await.unwrap().unwrap());

        // Progress is cached through the scheduler's observer.
        job.state().set_progress(i);
        assert_eq!(sched.job_progress(job.as_ref()), Some(i));
    }
}
