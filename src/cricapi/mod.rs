pub mod client;
pub mod provider;

pub use client::CricApi;
pub use provider::{CricketProvider, ProviderError};
