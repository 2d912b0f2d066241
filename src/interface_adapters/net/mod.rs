pub mod gsi;
pub mod relay;

pub use gsi::{ListenerSettings, gsi_loop};
pub use relay::{relay_serializer, ws_handler};
