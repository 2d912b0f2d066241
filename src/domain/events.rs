// Typed events derived from a single telemetry snapshot.

use std::collections::BTreeMap;

/// World-space position or direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Parses the client's `"x, y, z"` encoding.
    ///
    /// Missing or malformed components become `NaN` instead of failing the record, so one bad
    /// coordinate never hides a player or grenade from the display.
    pub fn parse(raw: &str) -> Self {
        let mut components = raw.split(", ").map(parse_component);
        Self {
            x: components.next().unwrap_or(f64::NAN),
            y: components.next().unwrap_or(f64::NAN),
            z: components.next().unwrap_or(f64::NAN),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

fn parse_component(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

/// A telemetry connection ping. Always means the link is up.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionUpdate {
    // Name of the local player, when they are actively playing and not a coach.
    pub player: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    // Roster key (the player's steam id).
    pub id: String,
    pub slot: i64,
    pub name: String,
    pub team: Option<String>,
    pub health: i64,
    pub flashed: i64,
    // Facing in degrees, rounded to 3 decimals.
    pub angle: f64,
    // True for the player the local client is observing.
    pub active: bool,
    pub bomb: bool,
    pub bomb_active: bool,
    // Weapon name to rounds in the clip.
    pub ammo: BTreeMap<String, i64>,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmokeView {
    pub id: String,
    pub time: f64,
    pub team: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlashbangView {
    pub id: String,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfernoView {
    pub id: String,
    pub flames: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileView {
    // Grenade type followed by the grenade key, e.g. `hegrenade41`.
    pub id: String,
    pub kind: String,
    pub team: String,
    pub position: Vec3,
}

/// The single bucket a grenade entry lands in for a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GrenadeView {
    Smoke(SmokeView),
    Flashbang(FlashbangView),
    Inferno(InfernoView),
    Projectile(ProjectileView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BombView {
    pub state: String,
    // Steam id of the carrier, when someone holds it.
    pub carrier: Option<String>,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    Connection(ConnectionUpdate),
    Map(String),
    InLobby,
    Players(Vec<PlayerView>),
    Smokes(Vec<SmokeView>),
    Infernos(Vec<InfernoView>),
    Flashbangs(Vec<FlashbangView>),
    Projectiles(Vec<ProjectileView>),
    Round(String),
    CanBuy(bool),
    Bomb(BombView),
}

impl DomainEvent {
    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::Connection(_) => "connection",
            DomainEvent::Map(_) => "map",
            DomainEvent::InLobby => "in_lobby",
            DomainEvent::Players(_) => "players",
            DomainEvent::Smokes(_) => "smokes",
            DomainEvent::Infernos(_) => "infernos",
            DomainEvent::Flashbangs(_) => "flashbangs",
            DomainEvent::Projectiles(_) => "projectiles",
            DomainEvent::Round(_) => "round",
            DomainEvent::CanBuy(_) => "canbuy",
            DomainEvent::Bomb(_) => "bomb",
        }
    }
}
