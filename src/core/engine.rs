use crate::core::progress::{ProgressObserver, DEFAULT_STEP_INTERVAL, MIN_STEP_INTERVAL};
use crate::core::session::{Completion, Session};
use crate::domain::ports::RosterExtractor;
use crate::utils::error::{FailureKind, Result, RosterError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(Completion),
    /// The wait was abandoned and the session reset; the request itself keeps
    /// running and its result is dropped.
    Interrupted,
}

/// Resolves on Ctrl-C. Never resolves if the signal handler cannot be installed.
pub async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::debug!("Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Drives one extraction for a session: submits, animates the progress log
/// while waiting, then applies the outcome.
pub struct ExtractionEngine<E: RosterExtractor + 'static> {
    extractor: Arc<E>,
    step_interval: Duration,
}

impl<E: RosterExtractor + 'static> ExtractionEngine<E> {
    pub fn new(extractor: E) -> Self {
        Self {
            extractor: Arc::new(extractor),
            step_interval: DEFAULT_STEP_INTERVAL,
        }
    }

    /// Intervals below [`MIN_STEP_INTERVAL`] are raised to it; a zero period
    /// would stall the timer loop.
    pub fn with_step_interval(mut self, step_interval: Duration) -> Self {
        if step_interval < MIN_STEP_INTERVAL {
            tracing::warn!(
                "Step interval {:?} is too short, using {:?}",
                step_interval,
                MIN_STEP_INTERVAL
            );
        }
        self.step_interval = step_interval.max(MIN_STEP_INTERVAL);
        self
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub async fn run<O>(&self, session: &mut Session, observer: &mut O) -> Result<RunOutcome>
    where
        O: ProgressObserver + ?Sized,
    {
        self.run_until(session, observer, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but gives up waiting when `interrupt` resolves.
    pub async fn run_until<O, F>(
        &self,
        session: &mut Session,
        observer: &mut O,
        interrupt: F,
    ) -> Result<RunOutcome>
    where
        O: ProgressObserver + ?Sized,
        F: Future<Output = ()>,
    {
        let (ticket, request) = session.begin()?;
        observer.started(session.progress());

        let extractor = Arc::clone(&self.extractor);
        let mut call = tokio::spawn(async move { extractor.extract(&request).await });

        let start = Instant::now();
        let mut step_timer = interval_at(start + self.step_interval, self.step_interval);
        step_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let one_second = Duration::from_secs(1);
        let mut second_timer = interval_at(start + one_second, one_second);
        second_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(interrupt);

        let joined = loop {
            tokio::select! {
                biased;
                joined = &mut call => break Some(joined),
                _ = &mut interrupt => break None,
                _ = step_timer.tick() => {
                    session.progress_mut().advance_step();
                    observer.step(session.progress());
                }
                _ = second_timer.tick() => {
                    session.progress_mut().tick_second();
                    observer.tick(session.progress());
                }
            }
        };
        drop(step_timer);
        drop(second_timer);

        let Some(joined) = joined else {
            tracing::warn!("Stopped waiting for the extraction after {:?}", start.elapsed());
            session.reset();
            observer.finished(session.progress());
            return Ok(RunOutcome::Interrupted);
        };

        let outcome = joined.unwrap_or_else(|e| {
            Err(RosterError::extraction(
                FailureKind::Transport,
                format!("extraction task did not complete: {}", e),
            ))
        });
        tracing::debug!("Extraction finished after {:?}", start.elapsed());
        let completion = session.complete(ticket, outcome);
        observer.finished(session.progress());
        Ok(RunOutcome::Completed(completion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::ProgressLog;
    use crate::core::session::Phase;
    use crate::domain::model::{RosterDocument, WeekEntry};
    use crate::domain::request::ExtractionRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowExtractor {
        delay: Duration,
        calls: AtomicUsize,
        fail: bool,
    }

    impl SlowExtractor {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl RosterExtractor for SlowExtractor {
        async fn extract(&self, _request: &ExtractionRequest) -> Result<RosterDocument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(RosterError::extraction(FailureKind::MalformedJson, "bad json"));
            }
            Ok(RosterDocument {
                series_label: "Z SUP 0".to_string(),
                period_label: "NUIT".to_string(),
                weeks: vec![WeekEntry::new(1)],
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        started: usize,
        steps: usize,
        ticks: usize,
        finished: usize,
    }

    impl ProgressObserver for Recorder {
        fn started(&mut self, _log: &ProgressLog) {
            self.started += 1;
        }
        fn step(&mut self, _log: &ProgressLog) {
            self.steps += 1;
        }
        fn tick(&mut self, _log: &ProgressLog) {
            self.ticks += 1;
        }
        fn finished(&mut self, _log: &ProgressLog) {
            self.finished += 1;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timers_follow_the_projection_and_stop_on_completion() {
        let engine = ExtractionEngine::new(SlowExtractor::new(Duration::from_millis(5500)));
        let mut session = Session::new();
        session.set_text("week 1").unwrap();
        let mut recorder = Recorder::default();

        let outcome = engine.run(&mut session, &mut recorder).await.unwrap();

        assert_eq!(outcome, RunOutcome::Completed(Completion::Applied));
        assert_eq!(recorder.started, 1);
        assert_eq!(recorder.steps, 2);
        assert_eq!(recorder.ticks, 5);
        assert_eq!(recorder.finished, 1);
        assert_eq!(
            session.progress(),
            &ProgressLog::projected(Duration::from_millis(5500), DEFAULT_STEP_INTERVAL)
        );
        assert!(session.roster().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_applied_to_the_session() {
        let mut extractor = SlowExtractor::new(Duration::from_millis(100));
        extractor.fail = true;
        let engine = ExtractionEngine::new(extractor);
        let mut session = Session::new();
        session.set_text("week 1").unwrap();

        engine.run(&mut session, &mut Recorder::default()).await.unwrap();

        assert!(matches!(session.phase(), Phase::Failed { .. }));
        assert_eq!(session.text(), "week 1");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_input_never_reaches_the_extractor() {
        let engine = ExtractionEngine::new(SlowExtractor::new(Duration::from_millis(100)));
        let mut session = Session::new();

        let err = engine
            .run(&mut session, &mut Recorder::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RosterError::MissingInput));
        assert_eq!(engine.extractor().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_step_interval_is_raised_to_the_minimum() {
        let engine = ExtractionEngine::new(SlowExtractor::new(Duration::from_millis(5)))
            .with_step_interval(Duration::ZERO);
        assert_eq!(engine.step_interval, MIN_STEP_INTERVAL);

        let mut session = Session::new();
        session.set_text("week 1").unwrap();
        let mut recorder = Recorder::default();
        let outcome = engine.run(&mut session, &mut recorder).await.unwrap();

        assert_eq!(outcome, RunOutcome::Completed(Completion::Applied));
        assert!(recorder.steps >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_resets_the_session() {
        let engine = ExtractionEngine::new(SlowExtractor::new(Duration::from_secs(60)));
        let mut session = Session::new();
        session.set_text("week 1").unwrap();

        let outcome = engine
            .run_until(
                &mut session,
                &mut Recorder::default(),
                tokio::time::sleep(Duration::from_secs(3)),
            )
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Interrupted);
        assert_eq!(session.phase(), &Phase::Idle);
        assert_eq!(session.text(), "");
    }
}
