pub mod credentials;
pub mod file_system;
pub mod logger;
pub mod openrouter;
pub mod output;
