pub mod config;
pub mod devices;
pub mod error;
pub mod route;
pub mod session;
pub mod wavetable;
