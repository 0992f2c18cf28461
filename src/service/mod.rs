pub mod actuator;
pub mod auto;
pub mod scheduler;
pub mod server;
pub mod state;

pub use scheduler::Scheduler;
pub use state::{Controller, Settings};
