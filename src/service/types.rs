use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::{MatchReport, MatchThreshold};
use crate::storage::{
    GeoPoint, Item, ItemId, ItemStatus, ItemType, Match, MatchId, User, UserId,
};

#[derive(Debug, Clone)]
/// Settings the service needs beyond its collaborators.
pub struct ServiceSettings {
    /// Threshold for the matching pass that follows a report.
    pub report_threshold: MatchThreshold,
    /// Root that report `image_file` paths are resolved against.
    pub upload_dir: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            report_threshold: MatchThreshold::REPORT,
            upload_dir: PathBuf::from("./uploads"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// A lost/found report. The image is expected to already be in the upload directory.
pub struct ReportRequest {
    pub item_type: ItemType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image_file: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub location_landmark: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Item as shown to users (embeddings omitted).
pub struct ItemView {
    pub id: ItemId,
    pub user_id: UserId,
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub title: String,
    pub description: Option<String>,
    pub image_file: String,
    pub location: Option<GeoPoint>,
    pub location_landmark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub matchable: bool,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id,
            item_type: item.item_type,
            status: item.status,
            title: item.title.clone(),
            description: item.description.clone(),
            image_file: item.image_file.clone(),
            location: item.location,
            location_landmark: item.location_landmark.clone(),
            created_at: item.created_at,
            matchable: item.is_matchable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// How the matching pass after a report went.
pub enum MatchingStatus {
    Completed(MatchReport),
    /// The report was saved but matching did not commit.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub item: ItemView,
    pub matching: MatchingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinderContact {
    pub user_id: UserId,
    pub username: String,
    pub phone_number: Option<String>,
}

impl From<&User> for FinderContact {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            phone_number: user.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// A pending match on one of the user's lost items.
pub struct MatchNotification {
    pub match_id: MatchId,
    pub similarity_score: f32,
    pub created_at: DateTime<Utc>,
    pub lost_item: ItemView,
    pub found_item: ItemView,
    pub finder: FinderContact,
}

impl MatchNotification {
    pub(crate) fn new(record: &Match, lost: &Item, found: &Item, finder: &User) -> Self {
        Self {
            match_id: record.id,
            similarity_score: record.similarity_score,
            created_at: record.created_at,
            lost_item: lost.into(),
            found_item: found.into(),
            finder: finder.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// The user's active reports, newest first.
pub struct Dashboard {
    pub user: User,
    pub lost_items: Vec<ItemView>,
    pub found_items: Vec<ItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminOverview {
    pub users: Vec<User>,
    pub lost_items: Vec<ItemView>,
    pub found_items: Vec<ItemView>,
}
