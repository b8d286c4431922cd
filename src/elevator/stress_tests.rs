/*
 * Concurrency stress tests for the elevator core
 *
 * Many caller threads hammer one shared car. Every check is done with bounded
 * waits so a lost wakeup shows up as a failure instead of a hung test.
 *
 * Tests:
 * - test_concurrent_requests_all_complete
 * - test_event_stream_is_serialized
 * - test_cancelling_waiters_under_load
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod stress_tests {
    use crate::access::AccessPolicy;
    use crate::config::ElevatorConfig;
    use crate::elevator::{CancelToken, ElevatorCore};
    use crate::error::TransportError;
    use crate::shared::{ElevatorEvent, Floor, SecurityClearance};
    use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread::Builder;
    use std::time::{Duration, Instant};

    const N_CALLERS: usize = 8;
    const N_REQUESTS: usize = 25;
    const CLEARANCES: [SecurityClearance; 3] = [
        SecurityClearance::Confidential,
        SecurityClearance::Secret,
        SecurityClearance::TopSecret,
    ];

    fn setup_core(settle_delay_ms: u64) -> (Arc<ElevatorCore>, Receiver<ElevatorEvent>) {
        let (event_tx, event_rx) = unbounded::<ElevatorEvent>();
        let config = ElevatorConfig {
            settle_delay_ms,
            cancel_poll_ms: 1,
        };
        (Arc::new(ElevatorCore::with_events(&config, AccessPolicy::standard(), event_tx)), event_rx)
    }

    fn destination(caller: usize, request: usize) -> Floor {
        Floor::ALL[(caller * 7 + request * 3) % Floor::COUNT]
    }

    // Unit steps, all in one direction, ending at the destination
    fn assert_monotonic(from: Floor, to: Floor, floors: &[Floor]) {
        assert_eq!(floors.len(), from.distance(to), "{:?} -> {:?} visited {:?}", from, to, floors);
        let mut previous = from;
        for floor in floors {
            assert_eq!(previous.step_toward(to), Some(*floor), "{:?} -> {:?} visited {:?}", from, to, floors);
            previous = *floor;
        }
        assert_eq!(previous, to);
    }

    #[test]
    fn test_concurrent_requests_all_complete() {
        // Arrange
        let (core, _event_rx) = setup_core(0);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = unbounded::<usize>();

        // Act
        let mut handles = Vec::new();
        for caller in 0..N_CALLERS {
            let core = Arc::clone(&core);
            let in_flight = Arc::clone(&in_flight);
            let done_tx = done_tx.clone();
            let clearance = CLEARANCES[caller % CLEARANCES.len()];

            let handle = Builder::new()
                .name(format!("caller_{}", caller))
                .spawn(move || {
                    for request in 0..N_REQUESTS {
                        let to = destination(caller, request);
                        let mut from = None;
                        let mut floors = Vec::new();

                        let outcome = core.request_transport_observed(clearance, to, |event| match event {
                            ElevatorEvent::Departed { from: start, .. } => {
                                assert_eq!(in_flight.fetch_add(1, Ordering::SeqCst), 0, "two rides in flight");
                                from = Some(*start);
                            }
                            ElevatorEvent::FloorReached { floor } => {
                                assert_eq!(in_flight.load(Ordering::SeqCst), 1);
                                floors.push(*floor);
                            }
                            ElevatorEvent::Arrived { .. } => {
                                assert_eq!(in_flight.fetch_sub(1, Ordering::SeqCst), 1);
                            }
                        });

                        let from = from.unwrap();
                        assert_monotonic(from, to, &floors);
                        assert_eq!(outcome, core.policy().evaluate(clearance, to));
                    }
                    done_tx.send(caller).unwrap();
                })
                .unwrap();
            handles.push(handle);
        }
        drop(done_tx);

        // Assert
        let deadline = Instant::now() + Duration::from_secs(30);
        for _ in 0..N_CALLERS {
            match done_rx.recv_deadline(deadline) {
                Ok(_) => {}
                Err(RecvTimeoutError::Timeout) => panic!("Timed out waiting for callers to finish"),
                Err(e) => panic!("Caller thread died: {:?}", e),
            }
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(!core.is_busy());
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_event_stream_is_serialized() {
        // Purpose: Events of one ride are never interleaved with another ride's events

        // Arrange
        let (core, event_rx) = setup_core(1);
        let callers = 4;
        let requests = 5;

        // Act
        let handles: Vec<_> = (0..callers)
            .map(|caller| {
                let core = Arc::clone(&core);
                Builder::new()
                    .name(format!("caller_{}", caller))
                    .spawn(move || {
                        for request in 0..requests {
                            core.request_transport(CLEARANCES[caller % 3], destination(caller, request));
                        }
                    })
                    .unwrap()
            })
            .collect();

        let mut arrivals = 0;
        let mut current: Option<(Floor, Floor, Vec<Floor>)> = None;
        let mut last_settled = Floor::Ground;
        while arrivals < callers * requests {
            let event = match event_rx.recv_timeout(Duration::from_secs(10)) {
                Ok(event) => event,
                Err(e) => panic!("Error receiving from event_rx: {:?}", e),
            };

            match event {
                ElevatorEvent::Departed { from, to, .. } => {
                    assert!(current.is_none(), "departure before previous arrival");
                    assert_eq!(from, last_settled);
                    current = Some((from, to, Vec::new()));
                }
                ElevatorEvent::FloorReached { floor } => {
                    current.as_mut().expect("floor outside a ride").2.push(floor);
                }
                ElevatorEvent::Arrived { destination, .. } => {
                    let (from, to, floors) = current.take().expect("arrival outside a ride");
                    assert_eq!(to, destination);
                    assert_monotonic(from, to, &floors);
                    last_settled = destination;
                    arrivals += 1;
                }
            }
        }

        // Assert
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(current.is_none());
        assert_eq!(core.current_floor(), last_settled);
        assert!(event_rx.try_recv().is_err());
    }

    #[test]
    fn test_cancelling_waiters_under_load() {
        // Purpose: Waiters giving up must not swallow wakeups meant for others, and none of
        // them may ride once the token has fired

        // Arrange
        let (core, event_rx) = setup_core(1);
        let completed = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));
        let token = CancelToken::new();

        // Act
        let handles: Vec<_> = (0..N_CALLERS)
            .map(|caller| {
                let core = Arc::clone(&core);
                let completed = Arc::clone(&completed);
                let cancelled = Arc::clone(&cancelled);
                let token = token.clone();
                Builder::new()
                    .name(format!("caller_{}", caller))
                    .spawn(move || {
                        for request in 0..10 {
                            let to = destination(caller, request);
                            // Odd callers (TopSecret) give up once the token fires, even callers
                            // (Secret) never do. The one Confidential ride fires the token while it
                            // holds the car.
                            let result = if caller % 2 == 1 {
                                core.request_transport_cancellable(SecurityClearance::TopSecret, to, &token)
                            } else if caller == 0 && request == 2 {
                                Ok(core.request_transport_observed(SecurityClearance::Confidential, to, |event| {
                                    if let ElevatorEvent::Departed { .. } = event {
                                        token.cancel();
                                    }
                                }))
                            } else {
                                Ok(core.request_transport(SecurityClearance::Secret, to))
                            };
                            match result {
                                Ok(_) => completed.fetch_add(1, Ordering::SeqCst),
                                Err(TransportError::Cancelled) => cancelled.fetch_add(1, Ordering::SeqCst),
                                Err(e) => panic!("Unexpected error: {}", e),
                            };
                        }
                    })
                    .unwrap()
            })
            .collect();

        // Assert
        let (done_tx, done_rx) = unbounded::<()>();
        Builder::new()
            .name("joiner".into())
            .spawn(move || {
                for handle in handles {
                    handle.join().unwrap();
                }
                done_tx.send(()).unwrap();
            })
            .unwrap();

        match done_rx.recv_timeout(Duration::from_secs(30)) {
            Ok(()) => {}
            Err(e) => panic!("Callers did not finish: {:?}", e),
        }
        assert!(token.is_cancelled());
        assert_eq!(completed.load(Ordering::SeqCst) + cancelled.load(Ordering::SeqCst), N_CALLERS * 10);
        assert!(completed.load(Ordering::SeqCst) >= (N_CALLERS / 2) * 10);
        assert!(!core.is_busy());

        // Every ride admitted after the cancelling ride departed came after the cancel
        let departures: Vec<SecurityClearance> = event_rx
            .try_iter()
            .filter_map(|event| match event {
                ElevatorEvent::Departed { clearance, .. } => Some(clearance),
                _ => None,
            })
            .collect();
        let cancel_point = departures
            .iter()
            .position(|clearance| *clearance == SecurityClearance::Confidential)
            .expect("cancelling ride never departed");
        let late_rides = departures[cancel_point..]
            .iter()
            .filter(|clearance| **clearance == SecurityClearance::TopSecret)
            .count();
        assert_eq!(late_rides, 0, "cancelled waiters rode after the token fired");
    }
}
