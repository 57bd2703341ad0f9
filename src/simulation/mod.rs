// Occupancy simulation: periodic stochastic updates of every gate's people count

mod clock;
pub mod model;

pub use clock::{Clock, FixedClock, SystemClock};

use crate::config::SimulationConfig;
use crate::state::{NewAlert, StateStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};


/// Outcome of one simulation tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub gates_updated: usize,
    pub alerts_raised: usize,
    pub failures: usize,
}

/// Drives gate occupancy over time.
///
/// `tick()` can be called directly; `start()` runs it on a fixed period until `stop()`.
pub struct OccupancySimulator {
    store: Arc<StateStore>,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    period: Duration,
    initial_delay: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl OccupancySimulator {
    pub fn new(store: Arc<StateStore>, config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            clock: Arc::new(SystemClock),
            rng: Mutex::new(rng),
            period: Duration::from_secs(config.interval_seconds.max(1)),
            initial_delay: Duration::from_secs(config.initial_delay_seconds),
            task: Mutex::new(None),
        }
    }

    /// Replace the clock used for time-of-day biases
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the random source with a seeded one
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock().expect("simulator rng lock poisoned") = StdRng::seed_from_u64(seed);
        self
    }

    /// Advance every gate by one step.
    ///
    /// Each gate's read-compute-write runs under that gate's lock. A gate that cannot
    /// be updated is logged and skipped.
    pub fn tick(&self) -> TickReport {
        let ids = self.store.list_gates().into_iter().map(|gate| gate.id);
        self.tick_gates(ids)
    }

    fn tick_gates(&self, gate_ids: impl IntoIterator<Item = String>) -> TickReport {
        let mut report = TickReport::default();
        let hour = self.clock.local_hour();

        for gate_id in gate_ids {
            let result = self.store.modify_gate(&gate_id, |g| {
                let previous = g.current_count;
                let delta = {
                    let mut rng = self.rng.lock().expect("simulator rng lock poisoned");
                    model::propose_delta(previous, g.capacity, hour, &mut *rng)
                };
                g.current_count = model::apply_delta(previous, delta);
                previous
            });

            match result {
                Ok((previous, updated)) => {
                    report.gates_updated += 1;

                    // Only the transition into breach raises an alert
                    if updated.is_over_capacity() && previous <= updated.capacity {
                        self.store.create_alert(NewAlert::capacity_exceeded(&updated));
                        report.alerts_raised += 1;
                        info!(
                            gate = %updated.name,
                            count = updated.current_count,
                            capacity = updated.capacity,
                            "Gate exceeded capacity"
                        );
                    }
                }
                Err(e) => {
                    warn!(gate_id = %gate_id, error = %e, "Skipping gate update");
                    report.failures += 1;
                }
            }
        }

        debug!(
            gates = report.gates_updated,
            alerts = report.alerts_raised,
            failures = report.failures,
            "Crowd levels updated"
        );

        report
    }

    /// Start the periodic loop. Returns false if it was already running.
    pub fn start(self: &Arc<Self>) -> bool {
        let mut task = self.task.lock().expect("simulator task lock poisoned");
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        info!(
            interval_seconds = self.period.as_secs(),
            initial_delay_seconds = self.initial_delay.as_secs(),
            "Starting crowd simulation"
        );

        let simulator = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            simulator.run().await;
        }));
        true
    }

    /// Stop the periodic loop. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        let handle = self.task.lock().expect("simulator task lock poisoned").take();
        match handle {
            Some(handle) => {
                handle.abort();
                info!("Crowd simulation stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .expect("simulator task lock poisoned")
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn run(&self) {
        let mut ticker = interval_at(Instant::now() + self.initial_delay, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.tick();
        }
    }
}
