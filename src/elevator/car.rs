/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, warn};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::access::AccessPolicy;
use crate::config::ElevatorConfig;
use crate::elevator::CancelToken;
use crate::error::TransportError;
use crate::shared::{ArrivalOutcome, CarPhase, CarSnapshot, ElevatorEvent, Floor, SecurityClearance};

/**
 * The single shared elevator car.
 *
 * Every request goes through `Idle -> Admitted -> Moving -> Evaluating -> Idle`.
 * The `busy` flag is held for that whole window, so only one request moves the car
 * or has its access evaluated at any instant. The mutex only guards the car
 * state; it is never held across the settling delay or while calling observers.
 *
 * Waiters are woken one at a time with no ordering guarantee. A waiter may be
 * overtaken by newer callers indefinitely.
 *
 * # Fields
 * - `state`:           Current floor, busy flag and phase, guarded by one mutex.
 * - `car_free`:        Signalled once per release to wake a single waiter.
 * - `policy`:          Access table evaluated at arrival.
 * - `settle_delay`:    Pause after each unit step between adjacent floors.
 * - `cancel_poll`:     How often a cancellable waiter rechecks its token.
 * - `event_tx`:        Optional sink for progress and outcome events.
 */
pub struct ElevatorCore {
    state: Mutex<CarState>,
    car_free: Condvar,
    policy: AccessPolicy,
    settle_delay: Duration,
    cancel_poll: Duration,
    event_tx: Option<cbc::Sender<ElevatorEvent>>,
}

#[derive(Debug)]
struct CarState {
    floor: Floor,
    busy: bool,
    phase: CarPhase,
    owner: Option<ThreadId>,
}

#[derive(Clone, Copy)]
enum Wait<'a> {
    Forever,
    Deadline(Instant, Duration),
    Cancellable(&'a CancelToken),
}

// Holds the busy flag. Dropping it releases the car, also when unwinding.
struct Admission<'a> {
    core: &'a ElevatorCore,
}

/***************************************/
/*             Public API              */
/***************************************/
impl ElevatorCore {
    pub fn new(config: &ElevatorConfig, policy: AccessPolicy) -> ElevatorCore {
        ElevatorCore {
            state: Mutex::new(CarState {
                floor: Floor::Ground,
                busy: false,
                phase: CarPhase::Idle,
                owner: None,
            }),
            car_free: Condvar::new(),
            policy,
            settle_delay: config.settle_delay(),
            cancel_poll: config.cancel_poll(),
            event_tx: None,
        }
    }

    pub fn with_events(
        config: &ElevatorConfig,
        policy: AccessPolicy,
        event_tx: cbc::Sender<ElevatorEvent>,
    ) -> ElevatorCore {
        ElevatorCore {
            event_tx: Some(event_tx),
            ..ElevatorCore::new(config, policy)
        }
    }

    /// Blocks until the car is free, rides it to `destination` and reports
    /// whether `clearance` may exit there.
    pub fn request_transport(&self, clearance: SecurityClearance, destination: Floor) -> ArrivalOutcome {
        self.request_transport_observed(clearance, destination, |_| {})
    }

    /// Like [`ElevatorCore::request_transport`], additionally handing every event of
    /// this ride to `observer` on the calling thread, in order.
    ///
    /// The observer runs while this ride holds the car, so it must not request
    /// another ride from the same core. Doing so panics instead of deadlocking.
    pub fn request_transport_observed<F>(
        &self,
        clearance: SecurityClearance,
        destination: Floor,
        observer: F,
    ) -> ArrivalOutcome
    where
        F: FnMut(&ElevatorEvent),
    {
        match self.admit(clearance, destination, Wait::Forever) {
            Ok(admission) => self.ride(admission, clearance, destination, observer),
            Err(e) => unreachable!("unbounded admission failed: {}", e),
        }
    }

    /// Gives up with `TransportError::Cancelled` if `token` is cancelled before
    /// the request is admitted. A token that is already cancelled never admits.
    pub fn request_transport_cancellable(
        &self,
        clearance: SecurityClearance,
        destination: Floor,
        token: &CancelToken,
    ) -> Result<ArrivalOutcome, TransportError> {
        if token.is_cancelled() {
            return Err(TransportError::Cancelled);
        }
        let admission = self.admit(clearance, destination, Wait::Cancellable(token))?;
        Ok(self.ride(admission, clearance, destination, |_| {}))
    }

    /// Gives up with `TransportError::TimedOut` if the car has not become free
    /// within `timeout`. The ride itself is not bounded.
    pub fn request_transport_timeout(
        &self,
        clearance: SecurityClearance,
        destination: Floor,
        timeout: Duration,
    ) -> Result<ArrivalOutcome, TransportError> {
        let wait = Wait::Deadline(Instant::now() + timeout, timeout);
        let admission = self.admit(clearance, destination, wait)?;
        Ok(self.ride(admission, clearance, destination, |_| {}))
    }

    pub fn snapshot(&self) -> CarSnapshot {
        let state = self.lock_state();
        CarSnapshot {
            phase: state.phase,
            floor: state.floor,
            busy: state.busy,
        }
    }

    pub fn current_floor(&self) -> Floor {
        self.lock_state().floor
    }

    pub fn is_busy(&self) -> bool {
        self.lock_state().busy
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }
}

/***************************************/
/*         Private functions           */
/***************************************/
impl ElevatorCore {
    fn lock_state(&self) -> MutexGuard<'_, CarState> {
        // The admission guard restores a consistent state while unwinding
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(
        &self,
        clearance: SecurityClearance,
        destination: Floor,
        wait: Wait<'_>,
    ) -> Result<Admission<'_>, TransportError> {
        let mut state = self.lock_state();
        assert!(
            !state.busy || state.owner != Some(thread::current().id()),
            "ride requested from inside its own ride"
        );

        while state.busy {
            state = match wait {
                Wait::Forever => self.car_free.wait(state).unwrap_or_else(PoisonError::into_inner),
                Wait::Deadline(deadline, timeout) => {
                    let now = Instant::now();
                    if now >= deadline {
                        warn!("{:?} request to {:?} timed out after {:?}", clearance, destination, timeout);
                        return Err(TransportError::TimedOut(timeout));
                    }
                    self.car_free
                        .wait_timeout(state, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                Wait::Cancellable(token) => {
                    if token.is_cancelled() {
                        warn!("{:?} request to {:?} cancelled while waiting", clearance, destination);
                        return Err(TransportError::Cancelled);
                    }
                    self.car_free
                        .wait_timeout(state, self.cancel_poll)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }

        // A release may have woken us after the token fired; pass the wakeup on
        if let Wait::Cancellable(token) = wait {
            if token.is_cancelled() {
                warn!("{:?} request to {:?} cancelled while waiting", clearance, destination);
                drop(state);
                self.car_free.notify_one();
                return Err(TransportError::Cancelled);
            }
        }

        assert_eq!(state.phase, CarPhase::Idle, "car admitted while {:?}", state.phase);
        state.busy = true;
        state.phase = CarPhase::Admitted;
        state.owner = Some(thread::current().id());
        debug!("Admitted {:?} request from {:?} to {:?}", clearance, state.floor, destination);

        Ok(Admission { core: self })
    }

    fn ride<F>(
        &self,
        admission: Admission<'_>,
        clearance: SecurityClearance,
        destination: Floor,
        mut observer: F,
    ) -> ArrivalOutcome
    where
        F: FnMut(&ElevatorEvent),
    {
        let from = self.transition(CarPhase::Admitted, CarPhase::Moving);
        self.emit(
            ElevatorEvent::Departed {
                clearance,
                from,
                to: destination,
            },
            &mut observer,
        );

        while let Some(floor) = self.step_toward(destination) {
            self.emit(ElevatorEvent::FloorReached { floor }, &mut observer);
            thread::sleep(self.settle_delay);
        }

        self.transition(CarPhase::Moving, CarPhase::Evaluating);
        let outcome = self.policy.evaluate(clearance, destination);
        self.emit(
            ElevatorEvent::Arrived {
                clearance,
                destination,
                outcome,
            },
            &mut observer,
        );

        drop(admission);
        outcome
    }

    // Moves the car one floor closer and returns the new floor
    fn step_toward(&self, destination: Floor) -> Option<Floor> {
        let mut state = self.lock_state();
        assert!(state.busy, "car moved while not busy");
        let next = state.floor.step_toward(destination)?;
        state.floor = next;
        Some(next)
    }

    // Returns the floor the car is at when the transition happens
    fn transition(&self, from: CarPhase, to: CarPhase) -> Floor {
        let mut state = self.lock_state();
        assert_eq!(state.phase, from, "illegal transition to {:?}", to);
        assert!(state.busy, "transition to {:?} while not busy", to);
        state.phase = to;
        state.floor
    }

    fn emit<F>(&self, event: ElevatorEvent, observer: &mut F)
    where
        F: FnMut(&ElevatorEvent),
    {
        debug!("{:?}", event);
        observer(&event);
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        let mut state = self.core.lock_state();
        if !thread::panicking() {
            assert_eq!(state.phase, CarPhase::Evaluating, "car released before evaluation");
        }
        state.busy = false;
        state.phase = CarPhase::Idle;
        state.owner = None;
        debug!("Released car at {:?}", state.floor);
        drop(state);

        self.core.car_free.notify_one();
    }
}
