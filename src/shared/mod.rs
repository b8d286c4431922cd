pub mod macros;
pub mod structs;

pub use structs::ArrivalOutcome;
pub use structs::CarPhase;
pub use structs::CarSnapshot;
pub use structs::Direction;
pub use structs::ElevatorEvent;
pub use structs::Floor;
pub use structs::SecurityClearance;
