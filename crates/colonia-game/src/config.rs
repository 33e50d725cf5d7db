//! Game actor configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a running game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Capacity of the actor's command channel. When full, connections
    /// wait before their request is queued.
    pub channel_size: usize,

    /// Whether public changes caused by one player are pushed to the
    /// other joined players.
    pub broadcast: bool,

    /// How many pushed updates may wait for one player. A player whose
    /// queue is full stops receiving updates.
    pub update_buffer: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            channel_size: 64,
            broadcast: true,
            update_buffer: 256,
        }
    }
}
