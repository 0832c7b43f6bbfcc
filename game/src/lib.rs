pub mod autoplay;
pub mod config;
pub mod gesture;
pub mod jump;
pub mod platform;
pub mod session;
pub mod trigger;

pub use config::GameConfig;
pub use session::{GameSession, SessionInput, SessionOutcome, SessionSnapshot};
