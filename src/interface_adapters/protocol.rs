// Wire protocol DTOs for relay consumers.
// Every message is `{"type": kind, "data": payload}`; kinds without a payload omit `data`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{
    BombView, ConnectionUpdate, DomainEvent, FlashbangView, InfernoView, PlayerView,
    ProjectileView, RelayMessage, SmokeView, Vec3,
};

/// Messages fanned out to relay WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RelayMessageDto {
    Connection(ConnectionDto),
    Map(String),
    InLobby,
    Players(PlayersDto),
    Smokes(Vec<SmokeDto>),
    Infernos(Vec<InfernoDto>),
    Flashbangs(Vec<FlashbangDto>),
    Projectiles(Vec<ProjectileDto>),
    Round(String),
    #[serde(rename = "canbuy")]
    CanBuy(bool),
    Bomb(BombDto),
    // Consumers should re-read the current page.
    #[serde(rename = "pageUpdate")]
    PageUpdate,
}

impl From<RelayMessage> for RelayMessageDto {
    fn from(message: RelayMessage) -> Self {
        match message {
            RelayMessage::Event(event) => event.into(),
            RelayMessage::PageUpdate => RelayMessageDto::PageUpdate,
        }
    }
}

impl From<DomainEvent> for RelayMessageDto {
    fn from(event: DomainEvent) -> Self {
        match event {
            DomainEvent::Connection(update) => RelayMessageDto::Connection(update.into()),
            DomainEvent::Map(name) => RelayMessageDto::Map(name),
            DomainEvent::InLobby => RelayMessageDto::InLobby,
            DomainEvent::Players(players) => RelayMessageDto::Players(PlayersDto {
                players: players.into_iter().map(PlayerDto::from).collect(),
            }),
            DomainEvent::Smokes(smokes) => {
                RelayMessageDto::Smokes(smokes.into_iter().map(SmokeDto::from).collect())
            }
            DomainEvent::Infernos(infernos) => {
                RelayMessageDto::Infernos(infernos.into_iter().map(InfernoDto::from).collect())
            }
            DomainEvent::Flashbangs(flashbangs) => RelayMessageDto::Flashbangs(
                flashbangs.into_iter().map(FlashbangDto::from).collect(),
            ),
            DomainEvent::Projectiles(projectiles) => RelayMessageDto::Projectiles(
                projectiles.into_iter().map(ProjectileDto::from).collect(),
            ),
            DomainEvent::Round(phase) => RelayMessageDto::Round(phase),
            DomainEvent::CanBuy(can_buy) => RelayMessageDto::CanBuy(can_buy),
            DomainEvent::Bomb(bomb) => RelayMessageDto::Bomb(bomb.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PositionDto {
    // Non-finite components serialize as null.
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<Vec3> for PositionDto {
    fn from(position: Vec3) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionDto {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
}

impl From<ConnectionUpdate> for ConnectionDto {
    fn from(update: ConnectionUpdate) -> Self {
        Self {
            status: "up",
            player: update.player,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayersDto {
    pub players: Vec<PlayerDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: String,
    // Observer slot; doubles as the number drawn on the radar dot.
    pub num: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub health: i64,
    pub active: bool,
    pub flashed: i64,
    pub bomb: bool,
    pub bomb_active: bool,
    pub angle: f64,
    pub ammo: BTreeMap<String, i64>,
    pub position: PositionDto,
}

impl From<PlayerView> for PlayerDto {
    fn from(player: PlayerView) -> Self {
        Self {
            id: player.id,
            num: player.slot,
            name: player.name,
            team: player.team,
            health: player.health,
            active: player.active,
            flashed: player.flashed,
            bomb: player.bomb,
            bomb_active: player.bomb_active,
            angle: player.angle,
            ammo: player.ammo,
            position: player.position.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SmokeDto {
    pub id: String,
    pub time: f64,
    pub team: String,
    pub position: PositionDto,
}

impl From<SmokeView> for SmokeDto {
    fn from(smoke: SmokeView) -> Self {
        Self {
            id: smoke.id,
            time: smoke.time,
            team: smoke.team,
            position: smoke.position.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlashbangDto {
    pub id: String,
    pub position: PositionDto,
}

impl From<FlashbangView> for FlashbangDto {
    fn from(flashbang: FlashbangView) -> Self {
        Self {
            id: flashbang.id,
            position: flashbang.position.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfernoDto {
    pub id: String,
    pub flames_num: usize,
    pub flames_position: Vec<PositionDto>,
}

impl From<InfernoView> for InfernoDto {
    fn from(inferno: InfernoView) -> Self {
        Self {
            id: inferno.id,
            flames_num: inferno.flames.len(),
            flames_position: inferno.flames.into_iter().map(PositionDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileDto {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub team: String,
    pub position: PositionDto,
}

impl From<ProjectileView> for ProjectileDto {
    fn from(projectile: ProjectileView) -> Self {
        Self {
            id: projectile.id,
            kind: projectile.kind,
            team: projectile.team,
            position: projectile.position.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BombDto {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    pub position: PositionDto,
}

impl From<BombView> for BombDto {
    fn from(bomb: BombView) -> Self {
        Self {
            state: bomb.state,
            player: bomb.carrier,
            position: bomb.position.into(),
        }
    }
}
