pub mod fetch;
pub mod refresh;
pub mod watch;
