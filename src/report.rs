//! Markdown rendering of a [`GameSnapshot`].
//!
//! Sections are fixed and numbered so consecutive reports diff cleanly.
//! Error payloads and missing fields turn into placeholder lines; nothing
//! here can abort a report.

use chrono::{DateTime, TimeZone};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Write};

use crate::config::ReportOptions;
use crate::memory::DecodedMemory;
use crate::objects::{group_by_type, type_counts, CpuSummary, RoomSummary};
use crate::snapshot::{GameSnapshot, Scouting};
use crate::values::{
    as_object, format_number, format_thousands, map_array, map_f64, map_string, payload_error,
};

const USER_FIELDS: [&str; 4] = ["username", "gcl", "cpu", "cpuShard"];
const MAIN_MODULE: &str = "main";

pub fn render<Tz>(
    snapshot: &GameSnapshot,
    options: &ReportOptions,
    generated_at: DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let timestamp = generated_at.format("%Y-%m-%d %H:%M:%S");
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, snapshot, options, &timestamp);
    out
}

fn write_report(
    out: &mut String,
    snapshot: &GameSnapshot,
    options: &ReportOptions,
    generated_at: &dyn Display,
) -> fmt::Result {
    let summary = RoomSummary::from_payload(&snapshot.room_objects, options);

    writeln!(out, "# Screeps State ({})", generated_at)?;
    writeln!(out)?;

    write_user(out, &snapshot.user)?;
    writeln!(out, "## 2. Room: `{}` @ `{}`\n", snapshot.room, snapshot.shard)?;
    write_object_counts(out, snapshot, &summary)?;
    write_resources(out, &summary)?;
    write_creeps(out, &summary, options)?;
    write_construction(out, &summary)?;
    write_cpu(out, snapshot)?;
    write_scouting(out, &snapshot.scouting)?;
    write_code(out, &snapshot.code, options)?;
    write_summary(out, &summary)
}

fn write_error_note(out: &mut String, what: &str, payload: &Value) -> fmt::Result {
    if let Some(error) = payload_error(payload) {
        writeln!(out, "> {} unavailable: {}\n", what, error)?;
    }
    Ok(())
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn write_user(out: &mut String, user: &Value) -> fmt::Result {
    writeln!(out, "## 1. User")?;
    write_error_note(out, "user profile", user)?;

    let mut fields = Map::new();
    for key in USER_FIELDS {
        fields.insert(key.to_string(), user.get(key).cloned().unwrap_or(Value::Null));
    }
    writeln!(out, "```json\n{}\n```\n", pretty_json(&Value::Object(fields)))
}

fn write_object_counts(
    out: &mut String,
    snapshot: &GameSnapshot,
    summary: &RoomSummary,
) -> fmt::Result {
    writeln!(out, "## 3. Room Objects")?;
    write_error_note(out, "room objects", &snapshot.room_objects)?;
    writeln!(out, "```")?;
    if summary.groups.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for (kind, count) in type_counts(&summary.groups) {
        writeln!(out, "  {}: {}", kind, count)?;
    }
    writeln!(out, "```\n")
}

fn write_resources(out: &mut String, summary: &RoomSummary) -> fmt::Result {
    writeln!(out, "## 4. Resources\n")?;

    if let Some(controller) = &summary.controller {
        let total =
            controller.progress_total.map(format_thousands).unwrap_or_else(|| "?".to_string());
        let safe_mode = if controller.safe_mode_active() {
            format!("{} ticks", format_number(controller.safe_mode))
        } else {
            "none".to_string()
        };
        writeln!(out, "### Controller")?;
        writeln!(
            out,
            "- Level: **{}** | Progress: {} / {} | Safe Mode: {}",
            controller.level,
            format_thousands(controller.progress),
            total,
            safe_mode
        )?;
        writeln!(out, "- Safe Mode charges: {}", format_number(controller.safe_mode_available))?;
        if let Some(downgrade_time) = controller.downgrade_time {
            writeln!(out, "- Downgrades at tick: {}", format_number(downgrade_time))?;
        }
        writeln!(out)?;
    }

    let energy = &summary.energy;
    writeln!(
        out,
        "### Energy: {} / {}",
        format_number(energy.total()),
        format_number(energy.capacity())
    )?;
    writeln!(
        out,
        "- Spawn: {}/{} | Extension: {}/{}\n",
        format_number(energy.spawn_energy),
        format_number(energy.spawn_capacity()),
        format_number(energy.extension_energy),
        format_number(energy.extension_capacity())
    )?;

    if !summary.sources.is_empty() {
        writeln!(out, "### Sources")?;
        for (index, source) in summary.sources.iter().enumerate() {
            writeln!(
                out,
                "- Source {}: {}/{} ({}%)",
                index + 1,
                format_number(source.energy),
                format_number(source.capacity),
                source.percent
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_creeps(out: &mut String, summary: &RoomSummary, options: &ReportOptions) -> fmt::Result {
    let roster = &summary.creeps;
    let shown = options.creeps_per_role;

    writeln!(out, "## 5. Creeps")?;
    writeln!(
        out,
        "### My Creeps ({}, total WORK: {})\n",
        roster.owned_count(),
        roster.total_work()
    )?;
    if roster.roles.is_empty() {
        writeln!(out, "*no creeps*")?;
    }
    for (role, creeps) in &roster.roles {
        let work: usize = creeps.iter().map(|creep| creep.work).sum();
        writeln!(out, "**{}**: {} ({} WORK)", role, creeps.len(), work)?;
        for creep in creeps.iter().take(shown) {
            writeln!(out, "  - {}: {} parts, {} WORK", creep.name, creep.parts, creep.work)?;
        }
        if creeps.len() > shown {
            writeln!(out, "  - ... {} more", creeps.len() - shown)?;
        }
    }
    writeln!(out)?;

    if !roster.hostiles.is_empty() {
        writeln!(out, "### Hostile Creeps ({})\n", roster.hostiles.len())?;
        for hostile in roster.hostiles.iter().take(shown) {
            writeln!(out, "- {} ({})", hostile.name, hostile.owner)?;
        }
        if roster.hostiles.len() > shown {
            writeln!(out, "- ... {} more", roster.hostiles.len() - shown)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_construction(out: &mut String, summary: &RoomSummary) -> fmt::Result {
    writeln!(out, "## 6. Construction Queue")?;
    if summary.construction.is_empty() {
        writeln!(out, "*no construction tasks*")?;
    }
    for site in &summary.construction {
        writeln!(
            out,
            "- **{}** x{}: {}/{} ({}%)",
            site.structure_type,
            site.count,
            format_number(site.progress),
            format_number(site.total),
            site.percent
        )?;
    }
    writeln!(out)
}

fn write_cpu(out: &mut String, snapshot: &GameSnapshot) -> fmt::Result {
    writeln!(out, "## 7. CPU and Memory")?;

    if let DecodedMemory::Unavailable(reason) = &snapshot.memory {
        writeln!(out, "*memory unavailable ({})*", reason)?;
        writeln!(out, "- Memory: {} bytes\n", format_thousands(snapshot.memory_size as f64))?;
        return Ok(());
    }

    let cpu = CpuSummary::new(&snapshot.memory.stats(), &snapshot.user);
    writeln!(
        out,
        "- **CPU**: {:.2} / {} ({}%)",
        cpu.used,
        format_number(cpu.limit),
        cpu.percent
    )?;
    let time = cpu.time.map(format_number).unwrap_or_else(|| "N/A".to_string());
    writeln!(out, "- Game.time: {}", time)?;
    if let Some(creeps) = cpu.creeps {
        writeln!(out, "- Creeps (stats): {}", format_number(creeps))?;
    }
    writeln!(out, "- Memory: {} bytes\n", format_thousands(snapshot.memory_size as f64))
}

fn write_scouting(out: &mut String, scouting: &Scouting) -> fmt::Result {
    writeln!(out, "## 8. Adjacent Rooms\n")?;

    let scouted = match scouting {
        Scouting::Scouted(scouted) => scouted,
        Scouting::Skipped(reason) => return writeln!(out, "*scouting skipped: {}*\n", reason),
    };

    for neighbour in scouted {
        writeln!(out, "### {} ({})", neighbour.room.name, neighbour.room.direction.arrow())?;
        write_error_note(out, "room objects", &neighbour.payload)?;

        let groups = group_by_type(map_array(&neighbour.payload, "objects"));
        let controller = groups
            .get("controller")
            .and_then(|controllers| controllers.first())
            .filter(|controller| map_string(controller, "user").is_some());
        if let Some(controller) = controller {
            let level =
                map_f64(controller, "level").map(format_number).unwrap_or_else(|| "?".to_string());
            writeln!(out, "**player controlled** Level {}", level)?;
        }

        let counts = serde_json::to_value(type_counts(&groups)).unwrap_or(Value::Null);
        writeln!(out, "```json\n{}\n```\n", pretty_json(&counts))?;
    }
    Ok(())
}

fn write_code(out: &mut String, code: &Value, options: &ReportOptions) -> fmt::Result {
    writeln!(out, "## 9. Uploaded Code")?;
    write_error_note(out, "code", code)?;

    let modules = code.get("modules").and_then(as_object);
    let main = modules
        .and_then(|modules| modules.get(MAIN_MODULE))
        .and_then(Value::as_str)
        .unwrap_or("");

    if main.trim().is_empty() {
        writeln!(out, "**warning: code is empty**")?;
    } else {
        let lines: Vec<&str> = main.lines().collect();
        writeln!(out, "**{}** ({} lines)", MAIN_MODULE, lines.len())?;
        writeln!(out, "```javascript")?;
        for line in lines.iter().take(options.code_lines) {
            writeln!(out, "{}", line)?;
        }
        if lines.len() > options.code_lines {
            writeln!(out, "// ... {} more lines ...", lines.len() - options.code_lines)?;
        }
        writeln!(out, "```")?;
    }

    let others: Vec<(&String, usize)> = modules
        .map(|modules| {
            modules
                .iter()
                .filter(|(name, _)| name.as_str() != MAIN_MODULE)
                .map(|(name, body)| (name, body.as_str().map_or(0, |text| text.lines().count())))
                .collect()
        })
        .unwrap_or_default();
    if !others.is_empty() {
        writeln!(out, "\nOther modules:")?;
        for (name, lines) in others {
            writeln!(out, "- `{}` ({} lines)", name, lines)?;
        }
    }
    writeln!(out)
}

fn write_summary(out: &mut String, summary: &RoomSummary) -> fmt::Result {
    writeln!(out, "---\n## Summary\n")?;
    if let Some(controller) = &summary.controller {
        writeln!(
            out,
            "- **Level {}** | Progress: {}",
            controller.level,
            format_thousands(controller.progress)
        )?;
    }
    writeln!(
        out,
        "- **Creeps**: {} ({} WORK)",
        summary.creeps.owned_count(),
        summary.creeps.total_work()
    )?;
    writeln!(
        out,
        "- **Energy**: {} / {}",
        format_number(summary.energy.total()),
        format_number(summary.energy.capacity())
    )?;
    let hostiles = summary.creeps.hostiles.len();
    if hostiles > 0 {
        writeln!(out, "- **Threats**: {} hostile", hostiles)?;
    } else {
        writeln!(out, "- **Threats**: none")?;
    }
    writeln!(out, "\n---\nRaw Screeps API data above. Analyse before acting.")
}
