// strider-core: Types, errors, and config shared by the strider planning kernel.

pub mod config;
pub mod error;
pub mod robot;
pub mod system;

pub use config::{PlannerConfig, SlipConfig};
pub use error::{ConfigError, PlanningError, StateError, StriderError, TerrainError};
pub use robot::{Robot, StepRegion};
pub use system::{FloatingBaseSystem, FLOATING_BASE_DOF};
