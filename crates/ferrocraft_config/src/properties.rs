//! The `server.properties` document: a fixed schema of recognized keys with
//! vanilla defaults.
//!
//! Loading tolerates a missing file (all defaults), skips comments and blank
//! lines, trims keys and values, ignores unrecognized keys and keeps the
//! default for malformed values. Saving writes a normalized copy in schema
//! order; unrecognized input keys do not survive a round trip.

use std::path::Path;
use std::{fs, io};

use tracing::{debug, info, warn};

/// A value that can live on the right-hand side of `key=value`.
trait PropertyValue: Sized {
    fn parse(raw: &str) -> Option<Self>;
    fn format(&self) -> String;
}

impl PropertyValue for bool {
    /// Only the exact literals `true` and `false` are accepted.
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn format(&self) -> String {
        self.to_string()
    }
}

/// Base-0 integer parsing: a `0x`/`0o`/`0b` prefix selects the radix,
/// otherwise decimal.
fn parse_uint(raw: &str) -> Option<u64> {
    if let Some(digits) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(digits, 16).ok()
    } else if let Some(digits) = raw.strip_prefix("0o").or_else(|| raw.strip_prefix("0O")) {
        u64::from_str_radix(digits, 8).ok()
    } else if let Some(digits) = raw.strip_prefix("0b").or_else(|| raw.strip_prefix("0B")) {
        u64::from_str_radix(digits, 2).ok()
    } else {
        raw.parse().ok()
    }
}

macro_rules! uint_property {
    ($($ty:ty),+) => {
        $(impl PropertyValue for $ty {
            fn parse(raw: &str) -> Option<Self> {
                parse_uint(raw)?.try_into().ok()
            }

            fn format(&self) -> String {
                self.to_string()
            }
        })+
    };
}

uint_property!(u16, u32, u64);

impl PropertyValue for String {
    fn parse(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn format(&self) -> String {
        self.clone()
    }
}

macro_rules! properties_schema {
    ($($key:literal => $field:ident: $ty:ty = $default:expr;)+) => {
        /// The recognized `server.properties` schema, one field per key.
        #[derive(Debug, Clone, PartialEq)]
        pub struct ServerProperties {
            $(pub $field: $ty,)+
        }

        impl Default for ServerProperties {
            fn default() -> Self {
                Self {
                    $($field: $default,)+
                }
            }
        }

        impl ServerProperties {
            /// Applies one `key=value` pair; returns false for keys outside
            /// the schema.
            fn apply(&mut self, key: &str, raw: &str) -> bool {
                match key {
                    $($key => {
                        match <$ty as PropertyValue>::parse(raw) {
                            Some(value) => self.$field = value,
                            None => {
                                warn!("[CONFIG] Malformed value for {}: {:?}, keeping default", key, raw);
                            }
                        }
                        true
                    })+
                    _ => false,
                }
            }

            /// Renders the normalized document, keys in schema order.
            #[must_use]
            pub fn to_properties_string(&self) -> String {
                let mut out = String::from("#Minecraft server properties\n");
                $(
                    out.push_str($key);
                    out.push('=');
                    out.push_str(&<$ty as PropertyValue>::format(&self.$field));
                    out.push('\n');
                )+
                out
            }
        }
    };
}

properties_schema! {
    "enable-jmx-monitoring" => enable_jmx_monitoring: bool = false;
    "rcon.port" => rcon_port: u16 = 25575;
    "level-seed" => level_seed: String = String::new();
    "gamemode" => gamemode: String = String::from("survival");
    "enable-command-block" => enable_command_block: bool = false;
    "enable-query" => enable_query: bool = false;
    "generator-settings" => generator_settings: String = String::from("{}");
    "enforce-secure-profile" => enforce_secure_profile: bool = true;
    "level-name" => level_name: String = String::from("world");
    "motd" => motd: String = String::from("A Minecraft Server");
    "query.port" => query_port: u16 = 25565;
    "pvp" => pvp: bool = true;
    "generate-structures" => generate_structures: bool = true;
    "max-chained-neighbor-updates" => max_chained_neighbor_updates: u32 = 1_000_000;
    "difficulty" => difficulty: String = String::from("easy");
    "network-compression-threshold" => network_compression_threshold: u32 = 256;
    "max-tick-time" => max_tick_time: u64 = 60_000;
    "require-resource-pack" => require_resource_pack: bool = false;
    "use-native-transport" => use_native_transport: bool = true;
    "max-players" => max_players: u32 = 20;
    "online-mode" => online_mode: bool = true;
    "enable-status" => enable_status: bool = true;
    "allow-flight" => allow_flight: bool = false;
    "initial-disabled-packs" => initial_disabled_packs: String = String::new();
    "broadcast-rcon-to-ops" => broadcast_rcon_to_ops: bool = true;
    "view-distance" => view_distance: u32 = 10;
    "server-ip" => server_ip: String = String::new();
    "resource-pack-prompt" => resource_pack_prompt: String = String::new();
    "allow-nether" => allow_nether: bool = true;
    "server-port" => server_port: u16 = 25565;
    "enable-rcon" => enable_rcon: bool = false;
    "sync-chunk-writes" => sync_chunk_writes: bool = true;
    "op-permission-level" => op_permission_level: u32 = 4;
    "prevent-proxy-connections" => prevent_proxy_connections: bool = false;
    "hide-online-players" => hide_online_players: bool = false;
    "resource-pack" => resource_pack: String = String::new();
    "entity-broadcast-range-percentage" => entity_broadcast_range_percentage: u32 = 100;
    "simulation-distance" => simulation_distance: u32 = 10;
    "rcon.password" => rcon_password: String = String::new();
    "player-idle-timeout" => player_idle_timeout: u32 = 0;
    "debug" => debug: bool = false;
    "force-gamemode" => force_gamemode: bool = false;
    "rate-limit" => rate_limit: u32 = 0;
    "hardcore" => hardcore: bool = false;
    "white-list" => white_list: bool = false;
    "broadcast-console-to-ops" => broadcast_console_to_ops: bool = true;
    "spawn-npcs" => spawn_npcs: bool = true;
    "spawn-animals" => spawn_animals: bool = true;
    "log-ips" => log_ips: bool = true;
    "function-permission-level" => function_permission_level: u32 = 2;
    "initial-enabled-packs" => initial_enabled_packs: String = String::from("vanilla");
    "level-type" => level_type: String = String::from("minecraft:normal");
    "text-filtering-config" => text_filtering_config: String = String::new();
    "spawn-monsters" => spawn_monsters: bool = true;
    "enforce-whitelist" => enforce_whitelist: bool = false;
    "spawn-protection" => spawn_protection: u32 = 16;
    "resource-pack-sha1" => resource_pack_sha1: String = String::new();
    "max-world-size" => max_world_size: u32 = 29_999_984;
}

impl ServerProperties {
    /// Parses a properties document. Comments (`#` first), blank lines and
    /// unrecognized keys are skipped; keys and values are trimmed.
    #[must_use]
    pub fn from_properties_str(text: &str) -> Self {
        let mut props = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!("[CONFIG] Skipping line without '=': {:?}", line);
                continue;
            };
            if !props.apply(key.trim(), value.trim()) {
                debug!("[CONFIG] Ignoring unrecognized key {:?}", key.trim());
            }
        }
        props
    }

    /// Loads from disk; a missing file means all defaults.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::from_properties_str(&text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("[CONFIG] {} not found, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("[CONFIG] Failed to read {}: {}, using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    /// Writes the normalized document back to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.to_properties_string())
    }
}
