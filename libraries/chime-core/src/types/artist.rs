//! Artist aggregate type

use crate::types::ArtistId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An artist, derived from the tracks referencing it as artist or
/// album artist. Recompute-only, like [`super::Album`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub album_count: u32,
    pub song_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
