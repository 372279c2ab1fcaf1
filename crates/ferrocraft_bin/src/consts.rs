/// Wire protocol 765, game version 1.20.4. No other versions are served.
pub const PROTOCOL_VERSION: i32 = 765;
pub const GAME_VERSION: &str = "1.20.4";

/// Largest legal frame body: the protocol caps packets at 2^21 - 1 bytes.
pub const MAX_FRAME_BYTES: usize = 2_097_151;

pub const PROPERTIES_PATH: &str = "server.properties";
pub const FAVICON_PATH: &str = "favicon.png";

pub const GAMELOOP_SLEEP_TICK: u64 = 50; // 20 ticks per second
