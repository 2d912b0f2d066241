pub mod frame;
pub mod http;
pub mod net;
pub mod protocol;
pub mod sinks;
pub mod state;
