use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{TimeZone, Utc};
use flate2::{write::GzEncoder, Compression};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use screeps_game_state_lib::report::render;
use screeps_game_state_lib::snapshot::{self, Scouting};
use screeps_game_state_lib::{ReportOptions, ScreepsApi, StateError};

/// Canned API answering by exact endpoint, recording the call order.
struct FixtureApi {
    responses: HashMap<String, Value>,
    calls: Mutex<Vec<String>>,
}

impl FixtureApi {
    fn new(responses: Vec<(&str, Value)>) -> Self {
        FixtureApi {
            responses: responses.into_iter().map(|(key, value)| (key.to_string(), value)).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ScreepsApi for FixtureApi {
    async fn get(&self, endpoint: &str) -> Value {
        self.calls.lock().unwrap().push(endpoint.to_string());
        self.responses
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| json!({ "error": format!("no fixture for {}", endpoint) }))
    }
}

fn gz_memory(memory: &Value) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(memory.to_string().as_bytes()).unwrap();
    format!("gz:{}", STANDARD.encode(encoder.finish().unwrap()))
}

fn room_objects() -> Value {
    json!({
        "ok": 1,
        "objects": [
            { "type": "controller", "level": 2, "progress": 10000, "user": "u1",
              "safeModeAvailable": 1 },
            { "type": "spawn", "name": "Spawn1", "user": "u1", "store": { "energy": 150 } },
            { "type": "extension", "user": "u1", "store": { "energy": 25 } },
            { "type": "extension", "user": "u1", "store": { "energy": 25 } },
            { "type": "source", "energy": 3000, "energyCapacity": 3000 },
            { "type": "creep", "name": "Harvester1", "user": "u1",
              "body": [{ "type": "work" }, { "type": "carry" }, { "type": "move" }] },
            { "type": "creep", "name": "Builder2", "user": "u1",
              "body": [{ "type": "work" }, { "type": "work" }, { "type": "move" }] },
            { "type": "creep", "name": "Bob", "user": "u1", "body": [{ "type": "move" }] },
            { "type": "constructionSite", "structureType": "extension",
              "progress": 300, "progressTotal": 3000 }
        ],
        "users": { "u1": { "username": "tester" } }
    })
}

fn fixture(memory: Value) -> FixtureApi {
    FixtureApi::new(vec![
        ("/auth/me", json!({ "ok": 1, "username": "tester", "gcl": 12000, "cpu": 20 })),
        (
            "/user/overview?statName=energyHarvested&interval=8",
            json!({ "ok": 1, "shards": { "shard3": { "rooms": ["W13N45"] } } }),
        ),
        ("/game/room-objects?room=W13N45&shard=shard3", room_objects()),
        ("/user/memory?shard=shard3", json!({ "ok": 1, "data": memory })),
        (
            "/game/room-objects?room=W14N45&shard=shard3",
            json!({ "ok": 1, "objects": [
                { "type": "controller", "level": 5, "user": "neighbour" },
                { "type": "source" }
            ] }),
        ),
        ("/game/room-objects?room=W12N45&shard=shard3", json!({ "ok": 1, "objects": [] })),
        ("/game/room-objects?room=W13N46&shard=shard3", json!({ "ok": 1, "objects": [] })),
        (
            "/user/code",
            json!({ "ok": 1, "modules": { "main": "module.exports.loop = function () {\n};" } }),
        ),
    ])
}

fn render_fixed(state: &snapshot::GameSnapshot, options: &ReportOptions) -> String {
    render(state, options, Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap())
}

#[tokio::test]
async fn end_to_end_report() {
    let memory = json!({ "stats": { "cpu": 3.5, "time": 4242, "creeps": 3 } });
    let api = fixture(json!(gz_memory(&memory)));
    let options = ReportOptions::default();

    let state = snapshot::collect(&api, &options).await.unwrap();
    let report = render_fixed(&state, &options);

    assert!(report.contains("## 2. Room: `W13N45` @ `shard3`"));
    assert!(report.contains("- Level: **2** | Progress: 10,000 / 45,000 | Safe Mode: none"));
    assert!(report.contains("### Energy: 200 / 400"));
    assert!(report.contains("- Spawn: 150/300 | Extension: 50/100"));
    assert!(report.contains("- Source 1: 3000/3000 (100%)"));
    assert!(report.contains("### My Creeps (3, total WORK: 3)"));
    assert!(report.contains("**harvester**: 1 (1 WORK)"));
    assert!(report.contains("**builder**: 1 (2 WORK)"));
    assert!(report.contains("**other**: 1 (0 WORK)"));
    assert!(!report.contains("Hostile Creeps"));
    assert!(report.contains("- **extension** x1: 300/3000 (10%)"));
    assert!(report.contains("- **CPU**: 3.50 / 20 (17%)"));
    assert!(report.contains("- Game.time: 4242"));
    assert!(report.contains("### W14N45 (←)\n**player controlled** Level 5"));
    assert!(report.contains("### W13N44 (↓)\n> room objects unavailable: no fixture for"));
    assert!(report.contains("**main** (2 lines)"));
    assert!(report.contains("- **Level 2** | Progress: 10,000"));
    assert!(report.contains("- **Energy**: 200 / 400"));
    assert!(report.contains("- **Threats**: none"));
}

#[tokio::test]
async fn calls_run_in_fixed_order() {
    let api = fixture(json!(""));
    let options = ReportOptions::default();

    snapshot::collect(&api, &options).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            "/auth/me",
            "/user/overview?statName=energyHarvested&interval=8",
            "/game/room-objects?room=W13N45&shard=shard3",
            "/user/memory?shard=shard3",
            "/game/room-objects?room=W14N45&shard=shard3",
            "/game/room-objects?room=W12N45&shard=shard3",
            "/game/room-objects?room=W13N46&shard=shard3",
            "/game/room-objects?room=W13N44&shard=shard3",
            "/user/code",
        ]
    );
}

#[tokio::test]
async fn malformed_memory_still_renders_full_report() {
    let api = fixture(json!("gz:%%%definitely-not-base64%%%"));
    let options = ReportOptions::default();

    let state = snapshot::collect(&api, &options).await.unwrap();
    let report = render_fixed(&state, &options);

    assert!(report.contains("## 7. CPU and Memory\n*memory unavailable (invalid base64"));
    assert!(!report.contains("**CPU**"));
    assert!(report.contains("## 8. Adjacent Rooms"));
    assert!(report.contains("## 9. Uploaded Code"));
    assert!(report.contains("## Summary"));
}

#[tokio::test]
async fn hostile_creeps_are_flagged() {
    let mut objects = room_objects();
    objects["objects"].as_array_mut().unwrap().push(json!({
        "type": "creep", "name": "Raider", "user": "u2"
    }));
    objects["users"]["u2"] = json!({ "username": "Invader" });

    let mut api = fixture(json!(""));
    api.responses.insert("/game/room-objects?room=W13N45&shard=shard3".to_string(), objects);
    let options = ReportOptions::default();

    let state = snapshot::collect(&api, &options).await.unwrap();
    let report = render_fixed(&state, &options);

    assert!(report.contains("### Hostile Creeps (1)\n\n- Raider (Invader)"));
    assert!(report.contains("- **Threats**: 1 hostile"));
}

#[tokio::test]
async fn unresolvable_room_stops_after_overview() {
    let api = FixtureApi::new(vec![
        ("/auth/me", json!({ "ok": 1, "username": "tester" })),
        (
            "/user/overview?statName=energyHarvested&interval=8",
            json!({ "ok": 1, "shards": { "shard0": { "rooms": [] } } }),
        ),
    ]);

    let result = snapshot::collect(&api, &ReportOptions::default()).await;

    assert!(matches!(result, Err(StateError::NoRoom { shard: None })));
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn non_world_room_skips_scouting() {
    let api = fixture(json!(""));
    let options = ReportOptions {
        room: Some("sim".to_string()),
        shard: Some("shard3".to_string()),
        ..Default::default()
    };

    let state = snapshot::collect(&api, &options).await.unwrap();

    assert!(matches!(state.scouting, Scouting::Skipped(_)));
    assert_eq!(api.calls().len(), 5);
    let report = render_fixed(&state, &options);
    assert!(report.contains("*scouting skipped: `sim` is not a world room name*"));
    assert!(report.contains("> room objects unavailable: no fixture for"));
}

#[tokio::test]
async fn scouting_can_be_disabled() {
    let api = fixture(json!(""));
    let options = ReportOptions { scout: false, ..Default::default() };

    let state = snapshot::collect(&api, &options).await.unwrap();

    assert!(matches!(state.scouting, Scouting::Skipped(_)));
    assert_eq!(api.calls().last().map(String::as_str), Some("/user/code"));
    assert_eq!(api.calls().len(), 5);
}

#[tokio::test]
async fn missing_token_aborts_before_any_request() {
    if std::env::var("SCREEPS_TOKEN").is_ok() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let options = ReportOptions {
        env_file: dir.path().join(".env"),
        api_url: "http://127.0.0.1:9/api".to_string(),
        ..Default::default()
    };

    let result = screeps_game_state_lib::run(&options).await;

    assert!(matches!(result, Err(StateError::MissingToken { .. })));
}
