use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingVector;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype!(
    /// Store-assigned user identifier.
    UserId
);
id_newtype!(
    /// Store-assigned item identifier.
    ItemId
);
id_newtype!(
    /// Store-assigned match identifier.
    MatchId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Lost,
    Found,
}

impl ItemType {
    /// The category a new item is matched against.
    pub fn opposite(self) -> Self {
        match self {
            ItemType::Lost => ItemType::Found,
            ItemType::Found => ItemType::Lost,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Lost => "lost",
            ItemType::Found => "found",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lost" => Ok(ItemType::Lost),
            "found" => Ok(ItemType::Found),
            other => Err(format!("unknown item type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Returned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Returned,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Pending => f.write_str("pending"),
            MatchStatus::Returned => f.write_str("returned"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Registered user.
pub struct User {
    pub id: UserId,
    pub username: String,
    pub phone_number: Option<String>,
    pub is_admin: bool,
    pub coins: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A reported lost or found item, with its (possibly absent) embeddings.
pub struct Item {
    pub id: ItemId,
    pub user_id: UserId,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub title: String,
    pub description: Option<String>,
    /// Path relative to the upload directory.
    pub image_file: String,
    pub location: Option<GeoPoint>,
    pub location_landmark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub image_embedding: Option<EmbeddingVector>,
    pub text_embedding: Option<EmbeddingVector>,
}

impl Item {
    /// Returns `true` if both embeddings are present.
    pub fn is_matchable(&self) -> bool {
        self.image_embedding.is_some() && self.text_embedding.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A candidate pairing of one lost item with one found item.
pub struct Match {
    pub id: MatchId,
    pub lost_item_id: ItemId,
    pub found_item_id: ItemId,
    /// Combined score at creation time; never recomputed.
    pub similarity_score: f32,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
/// User fields supplied at registration.
pub struct NewUser {
    pub username: String,
    pub phone_number: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone)]
/// Item fields supplied at report time (ids and timestamps come from the store).
pub struct NewItem {
    pub user_id: UserId,
    pub item_type: ItemType,
    pub title: String,
    pub description: Option<String>,
    pub image_file: String,
    pub location: Option<GeoPoint>,
    pub location_landmark: Option<String>,
    pub image_embedding: Option<EmbeddingVector>,
    pub text_embedding: Option<EmbeddingVector>,
}

#[derive(Debug, Clone, PartialEq)]
/// A match staged by the engine, not yet assigned an id.
pub struct NewMatch {
    pub lost_item_id: ItemId,
    pub found_item_id: ItemId,
    pub similarity_score: f32,
}
