pub mod api;
pub mod poller;
