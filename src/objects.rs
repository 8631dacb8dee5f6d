//! Grouping of room objects by type and the summaries built on top.
//!
//! Every function here is pure over the object list of a single
//! `/game/room-objects` response.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::{ReportOptions, DEFAULT_CPU_LIMIT, FALLBACK_ROLE, ROLE_VOCABULARY};
use crate::memory::MemoryStats;
use crate::values::{as_object, map_array, map_f64, map_f64_or, map_string, percent};

pub const SPAWN_ENERGY_CAPACITY: f64 = 300.0;
pub const EXTENSION_ENERGY_CAPACITY: f64 = 50.0;
pub const SOURCE_DEFAULT_CAPACITY: f64 = 3000.0;

const UNKNOWN_TYPE: &str = "unknown";
const UNKNOWN_STRUCTURE: &str = "?";

/// Object type to objects of that type, in encounter order.
pub type ObjectGroups = BTreeMap<String, Vec<Value>>;

pub fn group_by_type(objects: &[Value]) -> ObjectGroups {
    let mut groups = ObjectGroups::new();
    for object in objects {
        let kind = map_string(object, "type").unwrap_or_else(|| UNKNOWN_TYPE.to_string());
        groups.entry(kind).or_default().push(object.clone());
    }
    groups
}

pub fn type_counts(groups: &ObjectGroups) -> BTreeMap<String, usize> {
    groups.iter().map(|(kind, objects)| (kind.clone(), objects.len())).collect()
}

fn group<'a>(groups: &'a ObjectGroups, kind: &str) -> &'a [Value] {
    groups.get(kind).map(Vec::as_slice).unwrap_or(&[])
}

/// Energy held by a spawn or extension: `store.energy`, else the legacy `energy` field.
pub fn stored_energy(object: &Value) -> f64 {
    object
        .get("store")
        .and_then(|store| map_f64(store, "energy"))
        .or_else(|| map_f64(object, "energy"))
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSummary {
    pub level: u32,
    pub progress: f64,
    /// `None` when neither the API nor the threshold table knows it.
    pub progress_total: Option<f64>,
    /// Remaining safe mode ticks; 0 when inactive.
    pub safe_mode: f64,
    pub safe_mode_available: f64,
    pub downgrade_time: Option<f64>,
}

impl ControllerSummary {
    pub fn from_groups(groups: &ObjectGroups, options: &ReportOptions) -> Option<Self> {
        let controller = group(groups, "controller").first()?;
        let level = map_f64_or(controller, "level", 0.0).max(0.0) as u32;
        let progress_total = map_f64(controller, "progressTotal")
            .filter(|total| *total > 0.0)
            .or_else(|| options.progress_required(level));

        Some(ControllerSummary {
            level,
            progress: map_f64_or(controller, "progress", 0.0),
            progress_total,
            safe_mode: map_f64_or(controller, "safeMode", 0.0),
            safe_mode_available: map_f64_or(controller, "safeModeAvailable", 0.0),
            downgrade_time: map_f64(controller, "downgradeTime"),
        })
    }

    pub fn safe_mode_active(&self) -> bool {
        self.safe_mode > 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergySummary {
    pub spawns: usize,
    pub extensions: usize,
    pub spawn_energy: f64,
    pub extension_energy: f64,
}

impl EnergySummary {
    pub fn from_groups(groups: &ObjectGroups) -> Self {
        let spawns = group(groups, "spawn");
        let extensions = group(groups, "extension");
        EnergySummary {
            spawns: spawns.len(),
            extensions: extensions.len(),
            spawn_energy: spawns.iter().map(stored_energy).sum(),
            extension_energy: extensions.iter().map(stored_energy).sum(),
        }
    }

    pub fn spawn_capacity(&self) -> f64 {
        self.spawns as f64 * SPAWN_ENERGY_CAPACITY
    }

    pub fn extension_capacity(&self) -> f64 {
        self.extensions as f64 * EXTENSION_ENERGY_CAPACITY
    }

    pub fn total(&self) -> f64 {
        self.spawn_energy + self.extension_energy
    }

    pub fn capacity(&self) -> f64 {
        self.spawn_capacity() + self.extension_capacity()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub energy: f64,
    pub capacity: f64,
    pub percent: i64,
}

pub fn summarize_sources(groups: &ObjectGroups) -> Vec<SourceSummary> {
    group(groups, "source")
        .iter()
        .map(|source| {
            let energy = map_f64_or(source, "energy", 0.0);
            let capacity = map_f64_or(source, "energyCapacity", SOURCE_DEFAULT_CAPACITY);
            SourceSummary { energy, capacity, percent: percent(energy, capacity) }
        })
        .collect()
}

/// Role of a creep from its name; the first vocabulary word it contains.
pub fn infer_role(name: &str) -> &'static str {
    let lowered = name.to_lowercase();
    ROLE_VOCABULARY
        .iter()
        .copied()
        .find(|role| lowered.contains(*role))
        .unwrap_or(FALLBACK_ROLE)
}

/// Body entries are `{type, hits}` objects; bare strings are accepted too.
pub fn count_work_parts(body: &[Value]) -> usize {
    body.iter()
        .filter(|part| {
            let kind = match part {
                Value::String(kind) => Some(kind.as_str()),
                other => other.get("type").and_then(Value::as_str),
            };
            kind == Some("work")
        })
        .count()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreepInfo {
    pub name: String,
    pub parts: usize,
    pub work: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostileCreep {
    pub name: String,
    pub owner: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreepRoster {
    /// User id taken from the first spawn.
    pub owner: Option<String>,
    pub roles: BTreeMap<String, Vec<CreepInfo>>,
    pub hostiles: Vec<HostileCreep>,
}

impl CreepRoster {
    /// `users` is the `users` map of the room-objects response, used to
    /// name hostile owners.
    pub fn from_groups(groups: &ObjectGroups, users: Option<&Value>) -> Self {
        let owner = group(groups, "spawn").first().and_then(|spawn| map_string(spawn, "user"));
        let mut roster = CreepRoster { owner, ..Default::default() };

        for creep in group(groups, "creep") {
            let name = map_string(creep, "name").unwrap_or_default();
            let user = map_string(creep, "user");
            let owned = roster.owner.is_some() && user == roster.owner;

            if !owned {
                roster.hostiles.push(HostileCreep { name, owner: resolve_username(user, users) });
                continue;
            }

            let body = map_array(creep, "body");
            let info = CreepInfo { parts: body.len(), work: count_work_parts(body), name };
            roster.roles.entry(infer_role(&info.name).to_string()).or_default().push(info);
        }
        roster
    }

    pub fn owned_count(&self) -> usize {
        self.roles.values().map(Vec::len).sum()
    }

    pub fn total_work(&self) -> usize {
        self.roles.values().flatten().map(|creep| creep.work).sum()
    }
}

fn resolve_username(user: Option<String>, users: Option<&Value>) -> String {
    let Some(user_id) = user else {
        return "unowned".to_string();
    };
    users
        .and_then(as_object)
        .and_then(|users| users.get(&user_id))
        .and_then(|entry| map_string(entry, "username"))
        .unwrap_or(user_id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionGroup {
    pub structure_type: String,
    pub count: usize,
    pub progress: f64,
    pub total: f64,
    pub percent: i64,
}

pub fn summarize_construction(groups: &ObjectGroups) -> Vec<ConstructionGroup> {
    let mut by_type: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
    for site in group(groups, "constructionSite") {
        let structure_type =
            map_string(site, "structureType").unwrap_or_else(|| UNKNOWN_STRUCTURE.to_string());
        by_type.entry(structure_type).or_default().push(site);
    }

    by_type
        .into_iter()
        .map(|(structure_type, sites)| {
            let progress: f64 = sites.iter().map(|site| map_f64_or(site, "progress", 0.0)).sum();
            let total: f64 =
                sites.iter().map(|site| map_f64_or(site, "progressTotal", 0.0)).sum();
            ConstructionGroup {
                structure_type,
                count: sites.len(),
                progress,
                total,
                percent: percent(progress, total),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CpuSummary {
    pub used: f64,
    pub limit: f64,
    pub percent: i64,
    pub time: Option<f64>,
    pub creeps: Option<f64>,
}

impl CpuSummary {
    pub fn new(stats: &MemoryStats, user: &Value) -> Self {
        let used = stats.cpu.unwrap_or(0.0);
        let limit = map_f64_or(user, "cpu", DEFAULT_CPU_LIMIT);
        CpuSummary {
            used,
            limit,
            percent: percent(used, limit),
            time: stats.time,
            creeps: stats.creeps,
        }
    }
}

/// Everything the report derives from one room's objects.
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub groups: ObjectGroups,
    pub controller: Option<ControllerSummary>,
    pub energy: EnergySummary,
    pub sources: Vec<SourceSummary>,
    pub creeps: CreepRoster,
    pub construction: Vec<ConstructionGroup>,
}

impl RoomSummary {
    /// Summarize a room-objects payload. Error payloads yield an empty summary.
    pub fn from_payload(payload: &Value, options: &ReportOptions) -> Self {
        let groups = group_by_type(map_array(payload, "objects"));
        RoomSummary {
            controller: ControllerSummary::from_groups(&groups, options),
            energy: EnergySummary::from_groups(&groups),
            sources: summarize_sources(&groups),
            creeps: CreepRoster::from_groups(&groups, payload.get("users")),
            construction: summarize_construction(&groups),
            groups,
        }
    }
}
