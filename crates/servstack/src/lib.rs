#[macro_use]
mod macros;

pub mod config;
pub mod detail;
pub mod error;
pub mod form;
pub mod gesture;
pub mod item;
pub mod listeners;
pub mod modal;
pub mod render;
pub mod selector;
pub mod track;

pub use config::StackConfig;
pub use error::{ConfigurationError, StackError};
pub use item::{Item, ItemSpec, catalogue};
pub use selector::{InputEvent, LoopingStackSelector};
