pub mod cancel;
pub mod caller;
pub mod car;
pub mod stress_tests;

pub use cancel::CancelToken;
pub use caller::Caller;
pub use car::ElevatorCore;
