//! Game logic
//!
//! Everything here is pure and driven by [`session::Session::tick`]; no
//! module talks to hardware.

pub mod colors;
pub mod config;
pub mod elimination;
pub mod registry;
pub mod sequence;
pub mod session;

pub use config::{ConfigError, GameConfig};
pub use elimination::Verdict;
pub use registry::{ControllerRegistry, ControllerState};
pub use session::{Phase, Session, TickOutcome};
