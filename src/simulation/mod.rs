pub mod agent;
pub mod presenter;

pub use agent::{Agent, Simulation};
pub use presenter::{OutputFormat, Presenter};
