pub mod config;
pub mod error;
pub mod exec;
pub mod registry;
pub mod skills;
pub mod tools;
pub mod traits;

pub use config::*;
pub use error::SkillError;
pub use exec::{CommandExecutor, CommandOutcome, ExitState};
pub use registry::ToolRegistry;
pub use skills::*;
pub use tools::*;
pub use traits::*;
