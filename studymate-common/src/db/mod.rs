//! SQLite persistence for progress, chat history and focus sessions

pub mod history;
pub mod init;
pub mod progress;
pub mod sessions;

pub use history::*;
pub use init::*;
pub use progress::*;
pub use sessions::*;
