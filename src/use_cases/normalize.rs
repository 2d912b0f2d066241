// Snapshot normalization: one raw snapshot in, an ordered list of domain events out.
// Invariants: pure (no clock, no I/O, no carried state); facets never suppress each other;
// facet order is connection, map/in_lobby, players, grenade buckets, round, canbuy, bomb.

use std::collections::BTreeMap;

use crate::domain::snapshot::Keyed;
use crate::domain::{
    BombView, ConnectionUpdate, DomainEvent, FlashbangView, GrenadeView, InfernoView, PlayerView,
    ProjectileView, RawGrenade, RawPhaseCountdowns, RawPlayer, RawSnapshot, SmokeView, Vec3,
};

const C4_WEAPON: &str = "weapon_c4";
// Flashbangs younger than this flicker on the radar right after the throw.
const FLASHBANG_MIN_LIFETIME_SECS: f64 = 1.4;
const BUY_WINDOW_SECS: f64 = 95.0;
const NO_BUY_PHASES: [&str; 4] = ["live", "bomb", "defuse", "over"];

pub fn normalize(snapshot: &RawSnapshot) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    let local = snapshot.player.as_ref();

    if snapshot.provider.is_some() {
        events.push(DomainEvent::Connection(connection_update(local)));
    }

    match &snapshot.map {
        Some(map) => events.push(DomainEvent::Map(map.name.clone().unwrap_or_default())),
        None => events.push(DomainEvent::InLobby),
    }

    if let Some(roster) = &snapshot.allplayers {
        events.push(DomainEvent::Players(player_views(roster, local)));
    }

    if let Some(grenades) = &snapshot.grenades {
        GrenadeBuckets::classify(grenades, snapshot).push_events(&mut events);
    }

    if let Some(round) = &snapshot.round {
        events.push(DomainEvent::Round(round.phase.clone().unwrap_or_default()));
    }

    if let Some(countdowns) = &snapshot.phase_countdowns {
        events.push(DomainEvent::CanBuy(can_buy(countdowns)));
    }

    if let Some(bomb) = &snapshot.bomb {
        events.push(DomainEvent::Bomb(BombView {
            state: bomb.state.clone().unwrap_or_default(),
            carrier: bomb.player.clone(),
            position: parse_position(bomb.position.as_deref()),
        }));
    }

    events
}

/// Coaches are never shown: their clan tag contains "coach" in any case.
pub fn is_coach(player: &RawPlayer) -> bool {
    player
        .clan
        .as_deref()
        .is_some_and(|clan| clan.to_lowercase().contains("coach"))
}

/// Buying is closed late in a live round and in the bomb/defuse/over phases.
/// Any other phase, including ones the client may add later, keeps the window open.
pub fn can_buy(countdowns: &RawPhaseCountdowns) -> bool {
    let restricted = countdowns
        .phase
        .as_deref()
        .is_some_and(|phase| NO_BUY_PHASES.contains(&phase));
    let remaining = countdowns.phase_ends_in.unwrap_or(f64::NAN);
    !(restricted && remaining < BUY_WINDOW_SECS)
}

/// Converts the client's forward vector into a radar heading in degrees.
pub fn facing_angle(forward: &str) -> f64 {
    let forward = Vec3::parse(forward);
    let angle = if forward.x > 0.0 {
        90.0 - 90.0 * forward.y
    } else {
        270.0 + 90.0 * forward.y
    };
    (angle * 1000.0).round() / 1000.0
}

fn connection_update(local: Option<&RawPlayer>) -> ConnectionUpdate {
    let player = local
        .filter(|player| !is_coach(player) && player.activity.as_deref() == Some("playing"))
        .and_then(|player| player.name.clone());
    ConnectionUpdate { player }
}

fn player_views(roster: &Keyed<RawPlayer>, local: Option<&RawPlayer>) -> Vec<PlayerView> {
    // A coach's point of view breaks the radar; show nobody until they switch.
    if local.is_some_and(is_coach) {
        return Vec::new();
    }
    let local_slot = local.and_then(|player| player.observer_slot);

    roster
        .iter()
        .filter(|(_, player)| !is_coach(player))
        .filter_map(|(id, player)| player_view(id, player, local_slot))
        .collect()
}

fn player_view(id: &str, player: &RawPlayer, local_slot: Option<i64>) -> Option<PlayerView> {
    let slot = player.observer_slot?;
    let mut bomb = false;
    let mut bomb_active = false;
    let mut ammo = BTreeMap::new();

    for (_, weapon) in &player.weapons {
        if weapon.name.as_deref() == Some(C4_WEAPON) {
            bomb = true;
            bomb_active = weapon.state.as_deref() == Some("active");
        } else if let (Some(name), Some(clip)) = (&weapon.name, weapon.ammo_clip) {
            // Ammo is only tracked to spot shots, so empty clips are left out.
            if clip != 0 {
                ammo.insert(name.clone(), clip);
            }
        }
    }

    let state = player.state.clone().unwrap_or_default();
    Some(PlayerView {
        id: id.to_string(),
        slot,
        name: player.name.clone().unwrap_or_default(),
        team: player.team.clone(),
        health: state.health.unwrap_or_default(),
        flashed: state.flashed.unwrap_or_default(),
        angle: facing_angle(player.forward.as_deref().unwrap_or_default()),
        active: local_slot == Some(slot),
        bomb,
        bomb_active,
        ammo,
        position: parse_position(player.position.as_deref()),
    })
}

#[derive(Debug, Default)]
struct GrenadeBuckets {
    smokes: Vec<SmokeView>,
    infernos: Vec<InfernoView>,
    flashbangs: Vec<FlashbangView>,
    projectiles: Vec<ProjectileView>,
}

impl GrenadeBuckets {
    fn classify(grenades: &Keyed<RawGrenade>, snapshot: &RawSnapshot) -> Self {
        let mut buckets = Self::default();
        for (id, grenade) in grenades {
            match classify_grenade(id, grenade, snapshot) {
                Some(GrenadeView::Smoke(smoke)) => buckets.smokes.push(smoke),
                Some(GrenadeView::Inferno(inferno)) => buckets.infernos.push(inferno),
                Some(GrenadeView::Flashbang(flash)) => buckets.flashbangs.push(flash),
                Some(GrenadeView::Projectile(projectile)) => buckets.projectiles.push(projectile),
                None => {}
            }
        }
        buckets
    }

    fn push_events(self, events: &mut Vec<DomainEvent>) {
        if !self.smokes.is_empty() {
            events.push(DomainEvent::Smokes(self.smokes));
        }
        if !self.infernos.is_empty() {
            events.push(DomainEvent::Infernos(self.infernos));
        }
        if !self.flashbangs.is_empty() {
            events.push(DomainEvent::Flashbangs(self.flashbangs));
        }
        if !self.projectiles.is_empty() {
            events.push(DomainEvent::Projectiles(self.projectiles));
        }
    }
}

/// Places a grenade in at most one bucket, checking smoke, flashbang, inferno, projectile in turn.
pub fn classify_grenade(id: &str, grenade: &RawGrenade, snapshot: &RawSnapshot) -> Option<GrenadeView> {
    let kind = grenade.kind.as_deref().unwrap_or_default();
    let position = parse_position(grenade.position.as_deref());

    // A smoke without a reported effect timer counts as deployed.
    let smoke_deployed = kind == "smoke" && grenade.effecttime.is_none_or(|time| time != 0.0);
    if smoke_deployed {
        let team = owner_team(grenade, snapshot)?;
        return Some(GrenadeView::Smoke(SmokeView {
            id: id.to_string(),
            time: grenade.effecttime.unwrap_or(f64::NAN),
            team,
            position,
        }));
    }

    if kind == "flashbang"
        && grenade
            .lifetime
            .is_some_and(|lifetime| lifetime >= FLASHBANG_MIN_LIFETIME_SECS)
    {
        return Some(GrenadeView::Flashbang(FlashbangView {
            id: id.to_string(),
            position,
        }));
    }

    if kind == "inferno" {
        // Fire that has not spread yet has nothing to draw.
        if grenade.flames.is_empty() {
            return None;
        }
        return Some(GrenadeView::Inferno(InfernoView {
            id: id.to_string(),
            flames: grenade
                .flames
                .iter()
                .map(|(_, flame)| Vec3::parse(flame))
                .collect(),
        }));
    }

    // Only an explicit zero velocity means the grenade is at rest.
    let moving = grenade
        .velocity
        .as_deref()
        .is_none_or(|velocity| !Vec3::parse(velocity).is_zero());
    if kind != "decoy" && moving {
        let team = owner_team(grenade, snapshot)?;
        return Some(GrenadeView::Projectile(ProjectileView {
            id: format!("{kind}{id}"),
            kind: kind.to_string(),
            team,
            position,
        }));
    }

    None
}

// None when the owner is not on this tick's roster; the grenade reappears once it is.
fn owner_team(grenade: &RawGrenade, snapshot: &RawSnapshot) -> Option<String> {
    let owner = snapshot.roster_player(grenade.owner.as_deref()?)?;
    Some(owner.team.clone().unwrap_or_default())
}

fn parse_position(raw: Option<&str>) -> Vec3 {
    Vec3::parse(raw.unwrap_or_default())
}
