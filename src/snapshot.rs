//! The fetch sequence behind one report.
//!
//! Calls run strictly one after another. Only an unresolvable room stops
//! the sequence; every other failure is kept as an error payload.

use serde_json::Value;

use crate::config::ReportOptions;
use crate::error::{Result, StateError};
use crate::http::ScreepsApi;
use crate::memory::{self, DecodedMemory};
use crate::rooms::{self, AdjacentRoom};
use crate::values::{as_object, map_array, value_as_non_empty_string};

pub const DEFAULT_SHARD: &str = "shard0";

pub const PROFILE_ENDPOINT: &str = "/auth/me";
pub const OVERVIEW_ENDPOINT: &str = "/user/overview?statName=energyHarvested&interval=8";
pub const CODE_ENDPOINT: &str = "/user/code";

pub fn room_objects_endpoint(room: &str, shard: &str) -> String {
    format!("/game/room-objects?room={}&shard={}", room, shard)
}

pub fn memory_endpoint(shard: &str) -> String {
    format!("/user/memory?shard={}", shard)
}

#[derive(Debug, Clone)]
pub struct ScoutedRoom {
    pub room: AdjacentRoom,
    pub payload: Value,
}

#[derive(Debug, Clone)]
pub enum Scouting {
    Scouted(Vec<ScoutedRoom>),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub user: Value,
    pub room: String,
    pub shard: String,
    pub room_objects: Value,
    pub memory: DecodedMemory,
    pub memory_size: usize,
    pub scouting: Scouting,
    pub code: Value,
}

/// Shards listed in the overview, in server order, with their room names.
fn overview_shards(overview: &Value) -> Vec<(String, Vec<String>)> {
    let Some(shards) = overview.get("shards").and_then(as_object) else {
        return Vec::new();
    };
    shards
        .iter()
        .map(|(shard, info)| {
            let rooms = map_array(info, "rooms").iter().filter_map(value_as_non_empty_string);
            (shard.clone(), rooms.collect())
        })
        .collect()
}

/// Room and shard to report on: an explicit `--room` wins, otherwise the
/// first room of the first shard that owns any.
pub fn resolve_room(overview: &Value, options: &ReportOptions) -> Option<(String, String)> {
    let shards = overview_shards(overview);
    let shard_filter = options.shard.as_deref();

    if let Some(room) = options.room.as_deref().map(str::trim).filter(|room| !room.is_empty()) {
        let shard = shard_filter
            .map(str::to_string)
            .or_else(|| {
                shards
                    .iter()
                    .find(|(_, rooms)| rooms.iter().any(|candidate| candidate == room))
                    .map(|(shard, _)| shard.clone())
            })
            .unwrap_or_else(|| DEFAULT_SHARD.to_string());
        return Some((room.to_string(), shard));
    }

    shards
        .into_iter()
        .filter(|(shard, _)| shard_filter.map_or(true, |wanted| wanted == shard))
        .find_map(|(shard, rooms)| rooms.into_iter().next().map(|room| (room, shard)))
}

pub async fn collect<A: ScreepsApi>(api: &A, options: &ReportOptions) -> Result<GameSnapshot> {
    let user = api.get(PROFILE_ENDPOINT).await;
    let overview = api.get(OVERVIEW_ENDPOINT).await;

    let (room, shard) = resolve_room(&overview, options)
        .ok_or_else(|| StateError::NoRoom { shard: options.shard.clone() })?;
    tracing::info!(%room, %shard, "resolved room");

    let room_objects = api.get(&room_objects_endpoint(&room, &shard)).await;

    let memory_response = api.get(&memory_endpoint(&shard)).await;
    let memory_data = memory_response.get("data");
    let memory = memory::decode(memory_data);
    let memory_size = memory::raw_size(memory_data);

    let scouting = if !options.scout {
        Scouting::Skipped("scouting disabled".to_string())
    } else if let Some(neighbours) = rooms::adjacent(&room) {
        let mut scouted = Vec::with_capacity(neighbours.len());
        for neighbour in neighbours {
            let payload = api.get(&room_objects_endpoint(&neighbour.name, &shard)).await;
            scouted.push(ScoutedRoom { room: neighbour, payload });
        }
        Scouting::Scouted(scouted)
    } else {
        tracing::warn!(%room, "room name has no world coordinates, skipping scouting");
        Scouting::Skipped(format!("`{}` is not a world room name", room))
    };

    let code = api.get(CODE_ENDPOINT).await;

    Ok(GameSnapshot {
        user,
        room,
        shard,
        room_objects,
        memory,
        memory_size,
        scouting,
        code,
    })
}
