/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::info;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::SimulationConfig;
use crate::elevator::{CancelToken, Caller, ElevatorCore};
use crate::error::SimulationError;
use crate::shared::Floor;

/**
 * A simulated agent: rides to a random floor, thinks for a while, repeats.
 *
 * # Fields
 * - `caller`:          The agent's identity, clearance and last floor.
 * - `core`:            The shared car.
 * - `think_time_ms`:   Range the pause between rides is drawn from.
 * - `max_requests`:    Stop after this many rides, 0 for no limit.
 * - `cancel`:          Abandons a ride that is still waiting for the car.
 * - `terminate_rx`:    Disconnects when the simulation is stopped.
 */
pub struct Agent {
    caller: Caller,
    core: Arc<ElevatorCore>,
    think_time_ms: RangeInclusive<u64>,
    max_requests: u32,
    cancel: CancelToken,
    terminate_rx: cbc::Receiver<()>,
}

// Running agent threads plus the handles to stop them
pub struct Simulation {
    handles: Vec<JoinHandle<u32>>,
    cancel: CancelToken,
    terminate_tx: Option<cbc::Sender<()>>,
}

/***************************************/
/*             Public API              */
/***************************************/
impl Agent {
    pub fn new(
        caller: Caller,
        core: Arc<ElevatorCore>,
        config: &SimulationConfig,
        cancel: CancelToken,
        terminate_rx: cbc::Receiver<()>,
    ) -> Agent {
        Agent {
            caller,
            core,
            think_time_ms: config.think_time_range_ms(),
            max_requests: config.requests_per_agent,
            cancel,
            terminate_rx,
        }
    }

    // Returns the number of completed rides
    pub fn run(mut self) -> u32 {
        let mut rng = rand::thread_rng();
        let mut rides = 0;

        while self.max_requests == 0 || rides < self.max_requests {
            let target = Floor::from_index(rng.gen_range(0..Floor::COUNT as u8));
            info!(
                "{:?} agent calling elevator from {:?} to {:?}",
                self.caller.clearance(),
                self.caller.floor(),
                target
            );

            // Only fails when the simulation is stopped while waiting for the car
            if self.caller.ride_cancellable(&self.core, target, &self.cancel).is_err() {
                break;
            }
            rides += 1;

            let think_time = Duration::from_millis(rng.gen_range(self.think_time_ms.clone()));
            cbc::select! {
                recv(self.terminate_rx) -> _ => break,
                default(think_time) => {}
            }
        }

        info!("{} finished after {} rides at {:?}", self.caller.id(), rides, self.caller.floor());
        rides
    }
}

impl Simulation {
    pub fn start(config: &SimulationConfig, core: Arc<ElevatorCore>) -> Result<Simulation, SimulationError> {
        let cancel = CancelToken::new();
        let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();
        let mut simulation = Simulation {
            handles: Vec::with_capacity(config.agents.len()),
            cancel,
            terminate_tx: Some(terminate_tx),
        };

        for (n, clearance) in config.agents.iter().enumerate() {
            let name = format!("agent_{}", n);
            let agent = Agent::new(
                Caller::new(name.clone(), *clearance),
                Arc::clone(&core),
                config,
                simulation.cancel.clone(),
                terminate_rx.clone(),
            );

            match Builder::new().name(name.clone()).spawn(move || agent.run()) {
                Ok(handle) => simulation.handles.push(handle),
                Err(source) => {
                    // Dropping `simulation` stops the agents already started
                    return Err(SimulationError::Spawn { name, source });
                }
            }
        }

        Ok(simulation)
    }

    pub fn agent_count(&self) -> usize {
        self.handles.len()
    }

    // Waits for every agent to finish on its own; returns rides per agent
    pub fn wait(mut self) -> Vec<u32> {
        self.join_all()
    }

    // Stops agents at their next wait point and joins them
    pub fn stop(mut self) -> Vec<u32> {
        self.signal_stop();
        self.join_all()
    }
}

/***************************************/
/*         Private functions           */
/***************************************/
impl Simulation {
    fn signal_stop(&mut self) {
        self.cancel.cancel();
        self.terminate_tx.take();
    }

    fn join_all(&mut self) -> Vec<u32> {
        self.handles
            .drain(..)
            .map(|handle| handle.join().unwrap_or_else(|_| {
                log::error!("Agent thread panicked");
                0
            }))
            .collect()
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            self.signal_stop();
            self.join_all();
        }
    }
}
