/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::{CancelToken, ElevatorCore};
use crate::error::TransportError;
use crate::shared::{ArrivalOutcome, Floor, SecurityClearance};

/**
 * An agent riding the shared car.
 *
 * Identity and clearance are fixed at creation. The last known floor belongs to
 * the caller and is only updated by its own rides; `ride` takes `&mut self` so a
 * caller can never have two requests outstanding.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    id: String,
    clearance: SecurityClearance,
    floor: Floor,
}

impl Caller {
    pub fn new(id: impl Into<String>, clearance: SecurityClearance) -> Caller {
        Caller {
            id: id.into(),
            clearance,
            floor: Floor::Ground,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn clearance(&self) -> SecurityClearance {
        self.clearance
    }

    pub fn floor(&self) -> Floor {
        self.floor
    }

    // The car always stops at the destination, also when exit is denied
    pub fn ride(&mut self, core: &ElevatorCore, destination: Floor) -> ArrivalOutcome {
        let outcome = core.request_transport(self.clearance, destination);
        self.floor = destination;
        outcome
    }

    pub fn ride_cancellable(
        &mut self,
        core: &ElevatorCore,
        destination: Floor,
        token: &CancelToken,
    ) -> Result<ArrivalOutcome, TransportError> {
        let outcome = core.request_transport_cancellable(self.clearance, destination, token)?;
        self.floor = destination;
        Ok(outcome)
    }
}
