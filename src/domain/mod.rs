// Domain layer: telemetry snapshot shapes, derived events, and sink ports.

pub mod errors;
pub mod events;
pub mod ports;
pub mod snapshot;

pub use errors::FrameError;
pub use events::{
    BombView, ConnectionUpdate, DomainEvent, FlashbangView, GrenadeView, InfernoView, PlayerView,
    ProjectileView, SmokeView, Vec3,
};
pub use ports::{Page, PresentationSink, RelayMessage, RelaySink};
pub use snapshot::{
    RawBomb, RawGrenade, RawMap, RawPhaseCountdowns, RawPlayer, RawPlayerState, RawProvider,
    RawRound, RawSnapshot, RawWeapon,
};
