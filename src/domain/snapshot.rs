// Raw telemetry snapshot as sent by the game client.
// Invariants: every facet is optional and decoded on its own; a missing facet means
// "no update this tick", and a malformed facet is dropped without touching the others.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::domain::errors::FrameError;

/// Keyed entries in source order.
pub type Keyed<T> = Vec<(String, T)>;

#[derive(Debug, Clone, Default)]
pub struct RawSnapshot {
    pub provider: Option<RawProvider>,
    // The player the local client is observing (or playing as).
    pub player: Option<RawPlayer>,
    pub map: Option<RawMap>,
    pub allplayers: Option<Keyed<RawPlayer>>,
    pub grenades: Option<Keyed<RawGrenade>>,
    pub round: Option<RawRound>,
    pub phase_countdowns: Option<RawPhaseCountdowns>,
    pub bomb: Option<RawBomb>,
}

impl RawSnapshot {
    /// Decodes a parsed frame. Only a non-object top level is an error.
    pub fn from_value(value: Value) -> Result<Self, FrameError> {
        match value {
            Value::Object(object) => Ok(Self::from_object(object)),
            other => Err(FrameError::Shape(format!(
                "expected a snapshot object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn from_object(mut object: Map<String, Value>) -> Self {
        Self {
            provider: facet(&mut object, "provider"),
            player: facet(&mut object, "player"),
            map: facet(&mut object, "map"),
            allplayers: keyed_facet(&mut object, "allplayers"),
            grenades: keyed_facet(&mut object, "grenades"),
            round: facet(&mut object, "round"),
            phase_countdowns: facet(&mut object, "phase_countdowns"),
            bomb: facet(&mut object, "bomb"),
        }
    }

    /// Looks up a player on this tick's roster by steam id.
    pub fn roster_player(&self, id: &str) -> Option<&RawPlayer> {
        self.allplayers
            .as_ref()?
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, player)| player)
    }

    /// True when the frame carried none of the known facets.
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.player.is_none()
            && self.map.is_none()
            && self.allplayers.is_none()
            && self.grenades.is_none()
            && self.round.is_none()
            && self.phase_countdowns.is_none()
            && self.bomb.is_none()
    }
}

// Only the facet's presence matters: it marks a live connection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProvider {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPlayer {
    pub name: Option<String>,
    pub clan: Option<String>,
    pub team: Option<String>,
    pub activity: Option<String>,
    #[serde(deserialize_with = "lenient_integer")]
    pub observer_slot: Option<i64>,
    pub state: Option<RawPlayerState>,
    #[serde(deserialize_with = "keyed_entries")]
    pub weapons: Keyed<RawWeapon>,
    pub position: Option<String>,
    pub forward: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPlayerState {
    #[serde(deserialize_with = "lenient_integer")]
    pub health: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub flashed: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWeapon {
    pub name: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_integer")]
    pub ammo_clip: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawMap {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawGrenade {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_identifier")]
    pub owner: Option<String>,
    pub position: Option<String>,
    pub velocity: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub lifetime: Option<f64>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub effecttime: Option<f64>,
    #[serde(deserialize_with = "keyed_entries")]
    pub flames: Keyed<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRound {
    pub phase: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPhaseCountdowns {
    pub phase: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub phase_ends_in: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBomb {
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_identifier")]
    pub player: Option<String>,
    pub position: Option<String>,
}

fn facet<T: DeserializeOwned>(object: &mut Map<String, Value>, key: &'static str) -> Option<T> {
    let value = object.remove(key).filter(|value| !value.is_null())?;
    serde_json::from_value(value)
        .inspect_err(|e| warn!(facet = key, error = %e, "malformed facet ignored"))
        .ok()
}

fn keyed_facet<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    key: &'static str,
) -> Option<Keyed<T>> {
    let entries = match object.remove(key)? {
        Value::Null => return None,
        Value::Object(entries) => entries,
        other => {
            warn!(facet = key, kind = json_kind(&other), "malformed facet ignored");
            return None;
        }
    };

    let decoded = entries
        .into_iter()
        .filter_map(|(id, entry)| match serde_json::from_value(entry) {
            Ok(entry) => Some((id, entry)),
            Err(e) => {
                warn!(facet = key, %id, error = %e, "malformed entry ignored");
                None
            }
        })
        .collect();
    Some(decoded)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Nested keyed maps (weapons, flames) skip entries that do not decode.
fn keyed_entries<'de, D, T>(deserializer: D) -> Result<Keyed<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => entries,
        _ => return Ok(Vec::new()),
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|entry| (key, entry)))
        .collect())
}

// Whole numbers only, including `3.0`; fractions, strings and other shapes read as absent.
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.is_finite() && value.fract() == 0.0)
                .filter(|value| *value >= i64::MIN as f64 && *value < i64::MAX as f64)
                .map(|value| value as i64)
        }),
        _ => None,
    })
}

// Timers arrive as strings like "1.398" but numbers are accepted too.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

// Steam ids arrive quoted after frame repair, or as bare numbers when short.
fn lenient_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn when_top_level_is_not_an_object_then_shape_error() {
        let result = RawSnapshot::from_value(json!([1, 2, 3]));

        assert!(matches!(result, Err(FrameError::Shape(_))));
    }

    #[test]
    fn when_object_has_no_known_facets_then_snapshot_is_empty() {
        let snapshot = RawSnapshot::from_value(json!({ "previously": {} })).expect("object");

        assert!(snapshot.is_empty());
    }

    #[test]
    fn when_one_facet_is_malformed_then_other_facets_still_decode() {
        let snapshot = RawSnapshot::from_value(json!({
            "map": "not-an-object",
            "round": { "phase": "freezetime" },
        }))
        .expect("object");

        assert!(snapshot.map.is_none());
        assert_eq!(
            snapshot.round.and_then(|round| round.phase).as_deref(),
            Some("freezetime")
        );
    }

    #[test]
    fn when_roster_is_decoded_then_source_key_order_is_kept() {
        let snapshot = RawSnapshot::from_value(json!({
            "allplayers": {
                "76561198000000009": { "name": "zeta", "observer_slot": 9 },
                "76561198000000001": { "name": "alpha", "observer_slot": 1 },
                "76561198000000005": { "name": "mid", "observer_slot": 5 },
            }
        }))
        .expect("object");

        let keys: Vec<&str> = snapshot
            .allplayers
            .as_ref()
            .expect("roster")
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(
            keys,
            ["76561198000000009", "76561198000000001", "76561198000000005"]
        );
        assert_eq!(
            snapshot
                .roster_player("76561198000000005")
                .and_then(|player| player.name.as_deref()),
            Some("mid")
        );
    }

    #[test]
    fn when_fields_use_alternate_encodings_then_they_are_read_leniently() {
        let snapshot = RawSnapshot::from_value(json!({
            "grenades": {
                "12": { "type": "smoke", "owner": 42, "effecttime": "3.250", "lifetime": 4.5 },
            },
            "phase_countdowns": { "phase": "live", "phase_ends_in": "94.999" },
            "allplayers": {
                "1": { "observer_slot": 1.5 },
            },
        }))
        .expect("object");

        let (_, grenade) = &snapshot.grenades.as_ref().expect("grenades")[0];
        assert_eq!(grenade.owner.as_deref(), Some("42"));
        assert_eq!(grenade.effecttime, Some(3.25));
        assert_eq!(grenade.lifetime, Some(4.5));
        assert_eq!(
            snapshot.phase_countdowns.as_ref().and_then(|c| c.phase_ends_in),
            Some(94.999)
        );
        assert_eq!(snapshot.roster_player("1").and_then(|p| p.observer_slot), None);
    }

    #[test]
    fn when_observer_slot_is_a_whole_float_then_it_reads_as_integer() {
        let snapshot = RawSnapshot::from_value(json!({
            "allplayers": {
                "1": { "observer_slot": 3.0 },
                "2": { "observer_slot": "4" },
                "3": { "observer_slot": 1e300 },
            },
        }))
        .expect("object");

        let slot = |id: &str| snapshot.roster_player(id).and_then(|p| p.observer_slot);
        assert_eq!(slot("1"), Some(3));
        assert_eq!(slot("2"), None);
        assert_eq!(slot("3"), None);
    }

    #[test]
    fn when_provider_carries_extra_fields_then_facet_is_present() {
        let snapshot = RawSnapshot::from_value(json!({
            "provider": { "name": "Counter-Strike: Global Offensive", "timestamp": 1700000000 },
        }))
        .expect("object");

        assert!(snapshot.provider.is_some());
    }

    #[test]
    fn when_facet_is_null_then_it_counts_as_absent() {
        let snapshot = RawSnapshot::from_value(json!({ "bomb": null })).expect("object");

        assert!(snapshot.bomb.is_none());
    }
}
