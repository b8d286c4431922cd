/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::cmp::Ordering;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SecurityClearance {
    Confidential,
    Secret,
    TopSecret,
}

/**
 * Physical stops of the car, bottom to top.
 *
 * The discriminants are contiguous so travel is plain integer arithmetic on the
 * index. Converting an index outside `0..Floor::COUNT` is a programming error and panics.
 */
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Floor {
    Ground = 0,
    Mezzanine = 1,
    Tier1 = 2,
    Tier2 = 3,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Stop,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalOutcome {
    Allowed,
    Denied,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarPhase {
    #[serde(rename = "idle")]
    Idle,
    #[serde(rename = "admitted")]
    Admitted,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "evaluating")]
    Evaluating,
}

// Read-only view of the car, taken under the core's lock
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarSnapshot {
    pub phase: CarPhase,
    pub floor: Floor,
    pub busy: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ElevatorEvent {
    Departed {
        clearance: SecurityClearance,
        from: Floor,
        to: Floor,
    },
    FloorReached {
        floor: Floor,
    },
    Arrived {
        clearance: SecurityClearance,
        destination: Floor,
        outcome: ArrivalOutcome,
    },
}

/***************************************/
/*             Public API              */
/***************************************/
impl Floor {
    pub const COUNT: usize = 4;
    pub const ALL: [Floor; Floor::COUNT] = [Floor::Ground, Floor::Mezzanine, Floor::Tier1, Floor::Tier2];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Floor {
        match index {
            0 => Floor::Ground,
            1 => Floor::Mezzanine,
            2 => Floor::Tier1,
            3 => Floor::Tier2,
            _ => panic!("Invalid floor index {}", index),
        }
    }

    pub fn direction_to(self, destination: Floor) -> Direction {
        match self.cmp(&destination) {
            Ordering::Less => Direction::Up,
            Ordering::Greater => Direction::Down,
            Ordering::Equal => Direction::Stop,
        }
    }

    // The adjacent floor one step closer to `destination`, or None when already there
    pub fn step_toward(self, destination: Floor) -> Option<Floor> {
        match self.direction_to(destination) {
            Direction::Up => Some(Floor::from_index(self.index() + 1)),
            Direction::Down => Some(Floor::from_index(self.index() - 1)),
            Direction::Stop => None,
        }
    }

    // Number of unit steps between two floors
    pub fn distance(self, other: Floor) -> usize {
        (self.index() as i16 - other.index() as i16).unsigned_abs() as usize
    }
}

impl From<u8> for Floor {
    fn from(item: u8) -> Self {
        Floor::from_index(item)
    }
}

impl ArrivalOutcome {
    pub fn is_allowed(&self) -> bool {
        *self == ArrivalOutcome::Allowed
    }
}

impl From<bool> for ArrivalOutcome {
    fn from(allowed: bool) -> Self {
        if allowed {
            ArrivalOutcome::Allowed
        } else {
            ArrivalOutcome::Denied
        }
    }
}
