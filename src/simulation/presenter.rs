/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{info, warn};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ArrivalOutcome, ElevatorEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Log,
    Json,
}

/**
 * Console side of the elevator: turns events into announcements.
 *
 * Runs until every sender of `event_rx` is gone, i.e. until the core is dropped.
 */
pub struct Presenter {
    event_rx: cbc::Receiver<ElevatorEvent>,
    format: OutputFormat,
}

impl Presenter {
    pub fn new(event_rx: cbc::Receiver<ElevatorEvent>, format: OutputFormat) -> Presenter {
        Presenter { event_rx, format }
    }

    // Returns the number of events presented
    pub fn run(self) -> usize {
        let mut presented = 0;
        for event in self.event_rx.iter() {
            match self.format {
                OutputFormat::Log => info!("{}", describe(&event)),
                OutputFormat::Json => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to serialize event {:?}: {}", event, e),
                },
            }
            presented += 1;
        }
        presented
    }
}

pub fn describe(event: &ElevatorEvent) -> String {
    match event {
        ElevatorEvent::Departed { from, to, .. } => format!("Elevator moving from {:?} to {:?}", from, to),
        ElevatorEvent::FloorReached { floor } => format!("Elevator at {:?}", floor),
        ElevatorEvent::Arrived {
            clearance,
            destination,
            outcome: ArrivalOutcome::Allowed,
        } => format!("{:?} agent allowed to exit at {:?}", clearance, destination),
        ElevatorEvent::Arrived {
            clearance,
            destination,
            outcome: ArrivalOutcome::Denied,
        } => format!("{:?} agent denied access to {:?}", clearance, destination),
    }
}
