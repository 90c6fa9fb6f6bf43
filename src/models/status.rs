// src/models/status.rs
use std::collections::HashMap;
use lazy_static::lazy_static;
use serde::Serialize;

pub const UNKNOWN_GAME_MODE: &str = "unknown";

lazy_static! {
    // keyed by game_type * 100 + game_mode
    static ref GAME_MODES: HashMap<i64, &'static str> = HashMap::from([
        (0, "casual"),
        (1, "competitive"),
        (2, "scrim competitive"),
        (100, "arms race"),
        (101, "demolition"),
        (102, "deathmatch"),
        (200, "training"),
        (300, "custom"),
        (400, "cooperative"),
        (500, "skirmish"),
    ]);
}

/// Looks up the readable name for a `game_type`/`game_mode` cvar pair.
pub fn game_mode_name(game_type: i64, game_mode: i64) -> &'static str {
    let id = game_type.saturating_mul(100).saturating_add(game_mode);
    GAME_MODES.get(&id).copied().unwrap_or(UNKNOWN_GAME_MODE)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    #[serde(rename = "map")]
    pub map_name: String,
    pub game_mode: String,
    pub player_count: u64,
    pub bot_count: u64,
    pub players: Vec<String>,

    #[serde(skip)]
    pub game_mode_cvar: i64,
    #[serde(skip)]
    pub game_type_cvar: i64,
}

impl ServerStatus {
    /// Fills `game_mode` from the two raw cvars.
    pub fn resolve_game_mode(&mut self) {
        self.game_mode = game_mode_name(self.game_type_cvar, self.game_mode_cvar).to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_combinations_resolve() {
        assert_eq!(game_mode_name(0, 0), "casual");
        assert_eq!(game_mode_name(0, 1), "competitive");
        assert_eq!(game_mode_name(0, 2), "scrim competitive");
        assert_eq!(game_mode_name(1, 0), "arms race");
        assert_eq!(game_mode_name(1, 1), "demolition");
        assert_eq!(game_mode_name(1, 2), "deathmatch");
        assert_eq!(game_mode_name(2, 0), "training");
        assert_eq!(game_mode_name(3, 0), "custom");
        assert_eq!(game_mode_name(4, 0), "cooperative");
        assert_eq!(game_mode_name(5, 0), "skirmish");
    }

    #[test]
    fn unlisted_ids_are_unknown() {
        assert_eq!(game_mode_name(9, 9), UNKNOWN_GAME_MODE);
        assert_eq!(game_mode_name(0, 3), UNKNOWN_GAME_MODE);
        assert_eq!(game_mode_name(-1, 0), UNKNOWN_GAME_MODE);
        assert_eq!(game_mode_name(i64::MAX, i64::MAX), UNKNOWN_GAME_MODE);
        assert_eq!(game_mode_name(0, 4_294_967_296), UNKNOWN_GAME_MODE);
        assert_eq!(game_mode_name(i64::MIN, 0), UNKNOWN_GAME_MODE);
    }

    #[test]
    fn serializes_without_cvars() {
        let mut status = ServerStatus {
            map_name: "de_inferno".to_string(),
            player_count: 1,
            bot_count: 2,
            players: vec!["Alice".to_string()],
            game_type_cvar: 1,
            game_mode_cvar: 2,
            ..Default::default()
        };
        status.resolve_game_mode();

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "map": "de_inferno",
                "game_mode": "deathmatch",
                "player_count": 1,
                "bot_count": 2,
                "players": ["Alice"],
            })
        );
    }
}
