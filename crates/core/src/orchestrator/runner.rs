//! Cycle orchestrator implementation.
//!
//! One loop per orchestrator, spawned on its own task. `stop()` clears the
//! running flag and broadcasts a shutdown signal; the loop checks both
//! before every worker and every task, and a pending sleep is interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::OrchestratorConfig;
use super::types::{
    CyclePhase, CycleReport, CycleStats, OrchestratorError, OrchestratorStats, OrchestratorStatus,
};
use crate::metrics;
use crate::worker::{WorkerPool, WorkerSnapshot};

/// Loop bookkeeping that is not part of the earnings board.
#[derive(Debug, Default)]
struct LoopState {
    cycle_count: u64,
    cycle_errors: u64,
    phase: CyclePhase,
    last_cycle_started_at: Option<DateTime<Utc>>,
    last_cycle_finished_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

/// Observes the running flag and the shutdown channel for one loop.
///
/// Once a stop has been seen it stays seen, even if the flag is set again
/// by a later `start()`.
struct ShutdownWatch {
    running: Arc<AtomicBool>,
    rx: broadcast::Receiver<()>,
    signalled: bool,
}

impl ShutdownWatch {
    fn requested(&mut self) -> bool {
        if !self.signalled {
            self.signalled = !self.running.load(Ordering::SeqCst)
                || !matches!(self.rx.try_recv(), Err(TryRecvError::Empty));
        }
        self.signalled
    }

    /// Sleep for `duration`. Returns true if woken by a stop.
    async fn sleep(&mut self, duration: Duration) -> bool {
        if self.requested() {
            return true;
        }
        tokio::select! {
            _ = self.rx.recv() => {
                self.signalled = true;
            }
            _ = tokio::time::sleep(duration) => {}
        }
        self.requested()
    }
}

/// The orchestrator - drives the worker pool through repeated cycles.
pub struct Orchestrator {
    config: OrchestratorConfig,
    pool: Arc<WorkerPool>,

    // Runtime state
    running: Arc<AtomicBool>,
    state: Arc<RwLock<LoopState>>,
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Create a new orchestrator. The loop is not started.
    pub fn new(config: OrchestratorConfig, pool: WorkerPool) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            pool: Arc::new(pool),
            running: Arc::new(AtomicBool::new(false)),
            state: Arc::new(RwLock::new(LoopState::default())),
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the cycle loop. Returns false if it was already running.
    ///
    /// Returns without waiting on a loop left over from a previous
    /// `stop()`; the new loop lets that one finish its in-flight step
    /// before running its first cycle, so cycles never overlap. The first
    /// cycle otherwise begins immediately.
    pub async fn start(&self) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Orchestrator already running");
            return false;
        }

        let mut handle = self.handle.lock().await;
        let previous = handle.take();

        info!(workers = self.pool.len(), "Starting orchestrator");
        *handle = Some(self.spawn_cycle_loop(previous));
        true
    }

    /// Request the loop to stop. Returns false if it was not running.
    ///
    /// Cooperative: an in-flight discovery or execution completes, nothing
    /// new starts after it.
    pub fn stop(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Orchestrator not running");
            return false;
        }

        info!("Stopping orchestrator");
        let _ = self.shutdown_tx.send(());
        true
    }

    /// Stop and wait for the loop task to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let previous = self.handle.lock().await.take();
        if let Some(previous) = previous {
            if let Err(e) = previous.await {
                warn!("Cycle loop ended abnormally: {}", e);
            }
        }
        info!("Orchestrator stopped");
    }

    /// Consistent snapshot of the loop and every worker.
    pub async fn stats(&self) -> OrchestratorStats {
        let (cycle_count, cycle_errors, phase, started, finished, last_error) = {
            let state = self.state.read().await;
            (
                state.cycle_count,
                state.cycle_errors,
                state.phase,
                state.last_cycle_started_at,
                state.last_cycle_finished_at,
                state.last_error.clone(),
            )
        };
        let pool = self.pool.snapshot().await;

        OrchestratorStats {
            cycle: CycleStats {
                running: self.is_running(),
                total_earnings: pool.total_earnings,
                tasks_completed: pool.tasks_completed,
                cycle_count,
                cycle_errors,
                phase,
                last_cycle_started_at: started,
                last_cycle_finished_at: finished,
                last_error,
            },
            workers: pool.workers,
        }
    }

    pub async fn status(&self) -> OrchestratorStatus {
        let state = self.state.read().await;
        OrchestratorStatus {
            running: self.is_running(),
            phase: state.phase,
            cycle_count: state.cycle_count,
            active_workers: self
                .pool
                .workers()
                .iter()
                .filter(|w| w.is_active())
                .count(),
            total_workers: self.pool.len(),
        }
    }

    /// Activate or deactivate a worker by name. Takes effect next time
    /// the loop reaches that worker.
    pub async fn set_worker_active(
        &self,
        name: &str,
        active: bool,
    ) -> Result<WorkerSnapshot, OrchestratorError> {
        let worker = self
            .pool
            .get(name)
            .ok_or_else(|| OrchestratorError::WorkerNotFound(name.to_string()))?;

        let was_active = worker.set_active(active);
        if was_active != active {
            info!(worker = %name, active, "Worker activity changed");
        }
        Ok(worker.snapshot().await)
    }

    /// Spawn the cycle loop task, chained after `previous` if given.
    fn spawn_cycle_loop(&self, previous: Option<JoinHandle<()>>) -> JoinHandle<()> {
        let pool = Arc::clone(&self.pool);
        let state = Arc::clone(&self.state);
        let config = self.config.clone();
        let mut watch = ShutdownWatch {
            running: Arc::clone(&self.running),
            rx: self.shutdown_tx.subscribe(),
            signalled: false,
        };

        tokio::spawn(async move {
            if let Some(previous) = previous {
                debug!("Waiting for previous cycle loop to finish");
                if let Err(e) = previous.await {
                    warn!("Previous cycle loop ended abnormally: {}", e);
                }
            }

            info!("Cycle loop started");
            loop {
                if watch.requested() {
                    break;
                }

                let delay = match Self::run_cycle(&pool, &state, &config, &mut watch).await {
                    Ok(report) if report.interrupted => break,
                    Ok(_) => config.cycle_interval(),
                    Err(e) => {
                        error!("Cycle failed: {}", e);
                        metrics::CYCLE_ERRORS.inc();
                        let mut state = state.write().await;
                        state.cycle_errors += 1;
                        state.last_error = Some(e.to_string());
                        state.last_cycle_finished_at = Some(Utc::now());
                        config.error_backoff()
                    }
                };

                Self::set_phase(&state, CyclePhase::Sleeping).await;
                if watch.sleep(delay).await {
                    info!("Cycle loop received shutdown signal");
                    break;
                }
            }
            Self::set_phase(&state, CyclePhase::Stopped).await;
            info!("Cycle loop stopped");
        })
    }

    async fn set_phase(state: &RwLock<LoopState>, phase: CyclePhase) {
        state.write().await.phase = phase;
    }

    /// One discover/execute pass over the active workers.
    async fn run_cycle(
        pool: &WorkerPool,
        state: &RwLock<LoopState>,
        config: &OrchestratorConfig,
        watch: &mut ShutdownWatch,
    ) -> Result<CycleReport, OrchestratorError> {
        let started = Instant::now();
        let cycle = {
            let mut state = state.write().await;
            state.cycle_count += 1;
            state.phase = CyclePhase::Discovering;
            state.last_cycle_started_at = Some(Utc::now());
            state.cycle_count
        };
        metrics::CYCLES_TOTAL.inc();
        debug!(cycle, "Cycle started");

        let mut report = CycleReport::default();
        for worker in pool.workers() {
            if watch.requested() {
                report.interrupted = true;
                return Ok(report);
            }
            if !worker.is_active() {
                debug!(worker = %worker.name(), "Skipping inactive worker");
                continue;
            }

            Self::set_phase(state, CyclePhase::Discovering).await;
            let tasks = worker.discover_tasks().await?;
            report.discovered += tasks.len();

            Self::set_phase(state, CyclePhase::Executing).await;
            for task in tasks.into_iter().take(config.max_tasks_per_worker) {
                if watch.requested() {
                    report.interrupted = true;
                    return Ok(report);
                }
                let outcome = worker.execute(&task).await?;
                report.executed += 1;
                if outcome.success {
                    report.succeeded += 1;
                    report.earned += outcome.earnings;
                }
            }
        }

        Self::set_phase(state, CyclePhase::Aggregating).await;
        let totals = pool.board().totals().await;
        state.write().await.last_cycle_finished_at = Some(Utc::now());
        metrics::CYCLE_DURATION.observe(started.elapsed().as_secs_f64());

        info!(
            cycle,
            discovered = report.discovered,
            executed = report.executed,
            succeeded = report.succeeded,
            earned = %report.earned,
            total_earnings = %totals.total_earnings,
            tasks_completed = totals.tasks_completed,
            "Cycle complete"
        );

        Ok(report)
    }
}
