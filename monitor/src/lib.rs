pub mod api;
pub mod blink;
pub mod host;
pub mod poller;
pub mod port;
pub mod view;
