pub mod host;
pub mod server;
pub mod simulator;
