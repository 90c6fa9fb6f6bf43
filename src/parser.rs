// src/parser.rs
//! Turns the text reply of `cvarlist game_; status` into a [`ServerStatus`].
//!
//! The console output is only loosely structured, so parsing never fails:
//! lines that do not fit are skipped and fields that are missing keep their
//! defaults.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use crate::models::status::ServerStatus;

lazy_static! {
    static ref PLAYER_COUNTS: Regex = Regex::new(r"(\d+) humans?,\s*(\d+) bots?")
        .expect("player count pattern");
}

const KEY_SEPARATOR: &str = ": ";
const BOT_MARKER: &str = "BOT";

pub fn parse_status(raw: &str) -> ServerStatus {
    let mut status = ServerStatus::default();

    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if line.starts_with('#') {
            if let Some(name) = roster_name(line) {
                status.players.push(name.to_string());
            }
        } else {
            apply_key_value(&mut status, line);
        }
    }

    status.resolve_game_mode();
    status
}

fn apply_key_value(status: &mut ServerStatus, line: &str) {
    // cvarlist rows carry more ": "-separated columns after the value
    let mut items = line.splitn(3, KEY_SEPARATOR);
    let key = items.next().unwrap_or_default().trim();
    let value = match items.next() {
        Some(value) => value.trim(),
        None => return,
    };

    match key {
        "map" => status.map_name = value.to_string(),
        "players" => {
            if let Some((humans, bots)) = parse_player_counts(value) {
                status.player_count = humans;
                status.bot_count = bots;
            } else {
                debug!("Unrecognised player summary: {:?}", value);
            }
        }
        "game_mode" => status.game_mode_cvar = value.parse().unwrap_or_default(),
        "game_type" => status.game_type_cvar = value.parse().unwrap_or_default(),
        _ => {}
    }
}

fn parse_player_counts(value: &str) -> Option<(u64, u64)> {
    let captures = PLAYER_COUNTS.captures(value)?;
    let humans = captures.get(1)?.as_str().parse().ok()?;
    let bots = captures.get(2)?.as_str().parse().ok()?;
    Some((humans, bots))
}

/// Returns the quoted name of a human roster line, `None` for bots and for
/// lines without a quoted name (column headers, `#end`).
fn roster_name(line: &str) -> Option<&str> {
    let parts: Vec<&str> = line.splitn(3, '"').collect();
    if parts.len() != 3 {
        return None;
    }

    let first_token = parts[2].trim().split(' ').next().unwrap_or_default();
    if first_token == BOT_MARKER {
        return None;
    }
    Some(parts[1])
}
