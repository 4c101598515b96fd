//! Application operations over the store, embedder, matching engine and lifecycle.
//!
//! Each operation opens its own unit(s) of work; no transaction outlives a call.

pub mod error;
pub mod types;


pub use error::{ServiceError, ServiceResult};
pub use types::{
    AdminOverview, Dashboard, FinderContact, ItemView, MatchNotification, MatchingStatus,
    RegisterRequest, ReportOutcome, ReportRequest, ServiceSettings,
};

use std::cmp::Reverse;
use std::path::{Component, Path};
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::embedding::{
    EmbeddingVector, MultimodalEmbedder, embed_image_or_absent, embed_text_or_absent,
};
use crate::lifecycle::{MatchLifecycle, ReturnOutcome};
use crate::matching::{MatchEngine, MatchReport};
use crate::storage::{
    Item, ItemStatus, ItemType, MatchId, MatchStatus, NewItem, NewUser, Store, UnitOfWork, User,
    UserId,
};

/// The lost-and-found application core.
pub struct LostFoundService<S, E: ?Sized> {
    store: Arc<S>,
    embedder: Arc<E>,
    engine: MatchEngine,
    lifecycle: MatchLifecycle,
    settings: ServiceSettings,
}

impl<S, E: ?Sized> std::fmt::Debug for LostFoundService<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LostFoundService")
            .field("engine", &self.engine)
            .field("lifecycle", &self.lifecycle)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S, E> LostFoundService<S, E>
where
    S: Store,
    E: MultimodalEmbedder + ?Sized + 'static,
{
    pub fn new(
        store: Arc<S>,
        embedder: Arc<E>,
        engine: MatchEngine,
        lifecycle: MatchLifecycle,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            engine,
            lifecycle,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn embedder(&self) -> &Arc<E> {
        &self.embedder
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Registers a user with zero coins.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register_user(&self, request: RegisterRequest) -> ServiceResult<User> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(ServiceError::invalid("username must not be blank"));
        }

        let mut tx = self.store.begin().await?;
        let user = tx.insert_user(NewUser {
            username: username.to_string(),
            phone_number: non_blank(request.phone_number),
            is_admin: false,
        })?;
        tx.commit().await?;

        info!(user = %user.id, "User registered");
        Ok(user)
    }

    /// Makes sure `username` exists and is an administrator.
    pub async fn ensure_admin(&self, username: &str) -> ServiceResult<User> {
        let mut tx = self.store.begin().await?;
        if let Some(existing) = tx.user_by_username(username)? {
            if !existing.is_admin {
                warn!(user = %existing.id, username, "Configured admin exists as a regular user");
            }
            return Ok(existing);
        }

        let admin = tx.insert_user(NewUser {
            username: username.to_string(),
            phone_number: None,
            is_admin: true,
        })?;
        tx.commit().await?;

        info!(user = %admin.id, username, "Administrator created");
        Ok(admin)
    }

    /// Saves a new report, embeds it, and matches it against the opposite pool.
    ///
    /// The item is committed before matching starts. A failed matching pass is
    /// reported in [`ReportOutcome::matching`] and does not undo the report.
    #[instrument(skip(self, request), fields(item_type = %request.item_type))]
    pub async fn report_item(
        &self,
        user_id: UserId,
        request: ReportRequest,
    ) -> ServiceResult<ReportOutcome> {
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::invalid("title must not be blank"));
        }
        validate_image_file(&request.image_file)?;

        {
            let tx = self.store.begin().await?;
            if tx.user(user_id)?.is_none() {
                return Err(ServiceError::UserNotFound(user_id));
            }
        }

        let description = non_blank(request.description);
        let text = match &description {
            Some(description) => format!("{} {}", title, description),
            None => title.clone(),
        };
        let image_path = self.settings.upload_dir.join(&request.image_file);
        let image = match tokio::fs::read(&image_path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(path = %image_path.display(), error = %e, "Report image unreadable");
                None
            }
        };

        let (image_embedding, text_embedding) = self.embed(image, text).await;

        let item = {
            let mut tx = self.store.begin().await?;
            let item = tx.insert_item(NewItem {
                user_id,
                item_type: request.item_type,
                title,
                description,
                image_file: request.image_file,
                location: request.location,
                location_landmark: non_blank(request.location_landmark),
                image_embedding,
                text_embedding,
            })?;
            tx.commit().await?;
            item
        };

        info!(
            item = %item.id,
            matchable = item.is_matchable(),
            "Report saved"
        );

        let matching = match self.match_item(&item).await {
            Ok(report) => MatchingStatus::Completed(report),
            Err(e) => {
                error!(item = %item.id, error = %e, "Matching pass failed");
                MatchingStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(ReportOutcome {
            item: ItemView::from(&item),
            matching,
        })
    }

    async fn embed(
        &self,
        image: Option<Vec<u8>>,
        text: String,
    ) -> (Option<EmbeddingVector>, Option<EmbeddingVector>) {
        let embedder = Arc::clone(&self.embedder);
        let task = tokio::task::spawn_blocking(move || {
            let image = image
                .as_deref()
                .and_then(|bytes| embed_image_or_absent(embedder.as_ref(), bytes));
            let text = embed_text_or_absent(embedder.as_ref(), &text);
            (image, text)
        });

        match task.await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                error!(error = %e, "Embedding task failed");
                (None, None)
            }
        }
    }

    async fn match_item(&self, item: &Item) -> ServiceResult<MatchReport> {
        let mut tx = self.store.begin().await?;
        // Re-read: the item may have changed between the two units of work.
        let current = tx.item(item.id)?.unwrap_or_else(|| item.clone());
        let report = self
            .engine
            .find_matches(&mut tx, &current, self.settings.report_threshold)?;
        tx.commit().await?;
        Ok(report)
    }

    /// Confirms a return on behalf of the lost item's owner.
    #[instrument(skip(self))]
    pub async fn confirm_return(
        &self,
        user_id: UserId,
        match_id: MatchId,
    ) -> ServiceResult<ReturnOutcome> {
        let mut tx = self.store.begin().await?;
        let outcome = self.lifecycle.confirm_return(&mut tx, match_id, user_id)?;
        if outcome.is_transition() {
            tx.commit().await?;
        }
        Ok(outcome)
    }

    /// The user's active lost and found items, newest first.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, user_id: UserId) -> ServiceResult<Dashboard> {
        let tx = self.store.begin().await?;
        let user = require_user(&tx, user_id)?;
        let items = newest_first(tx.items_for_user(user_id, ItemStatus::Active)?);

        let (lost_items, found_items) = split_by_type(&items);
        Ok(Dashboard {
            user,
            lost_items,
            found_items,
        })
    }

    /// Pending matches on the user's active lost items, with finder contact details.
    #[instrument(skip(self))]
    pub async fn notifications(&self, user_id: UserId) -> ServiceResult<Vec<MatchNotification>> {
        let tx = self.store.begin().await?;
        require_user(&tx, user_id)?;

        let lost_ids: Vec<_> = tx
            .items_for_user(user_id, ItemStatus::Active)?
            .into_iter()
            .filter(|i| i.item_type == ItemType::Lost)
            .map(|i| i.id)
            .collect();
        if lost_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut notifications = Vec::new();
        for record in tx.matches_for_lost_items(&lost_ids, MatchStatus::Pending)? {
            let (Some(lost), Some(found)) =
                (tx.item(record.lost_item_id)?, tx.item(record.found_item_id)?)
            else {
                warn!(match_id = %record.id, "Match references a missing item");
                continue;
            };
            let Some(finder) = tx.user(found.user_id)? else {
                warn!(match_id = %record.id, finder = %found.user_id, "Finder missing");
                continue;
            };
            notifications.push(MatchNotification::new(&record, &lost, &found, &finder));
        }

        debug!(count = notifications.len(), "Notifications collected");
        Ok(notifications)
    }

    /// The user's returned items, newest first.
    #[instrument(skip(self))]
    pub async fn history(&self, user_id: UserId) -> ServiceResult<Vec<ItemView>> {
        let tx = self.store.begin().await?;
        require_user(&tx, user_id)?;
        let items = newest_first(tx.items_for_user(user_id, ItemStatus::Returned)?);
        Ok(items.iter().map(ItemView::from).collect())
    }

    /// Every user and item. Administrators only.
    #[instrument(skip(self))]
    pub async fn admin_overview(&self, user_id: UserId) -> ServiceResult<AdminOverview> {
        let tx = self.store.begin().await?;
        let user = require_user(&tx, user_id)?;
        if !user.is_admin {
            warn!("Admin overview requested by non-admin");
            return Err(ServiceError::Forbidden(user_id));
        }

        let mut items = Vec::new();
        for item_type in [ItemType::Lost, ItemType::Found] {
            for status in [ItemStatus::Active, ItemStatus::Returned] {
                items.extend(tx.items_by_type_and_status(item_type, status)?);
            }
        }
        let items = newest_first(items);
        let (lost_items, found_items) = split_by_type(&items);

        Ok(AdminOverview {
            users: tx.users()?,
            lost_items,
            found_items,
        })
    }
}

fn require_user<T: UnitOfWork>(tx: &T, user_id: UserId) -> ServiceResult<User> {
    tx.user(user_id)?.ok_or(ServiceError::UserNotFound(user_id))
}

fn newest_first(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by_key(|i| Reverse((i.created_at, i.id)));
    items
}

fn split_by_type(items: &[Item]) -> (Vec<ItemView>, Vec<ItemView>) {
    let (lost, found): (Vec<&Item>, Vec<&Item>) =
        items.iter().partition(|i| i.item_type == ItemType::Lost);
    (
        lost.into_iter().map(ItemView::from).collect(),
        found.into_iter().map(ItemView::from).collect(),
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Image references must stay inside the upload directory.
fn validate_image_file(image_file: &str) -> ServiceResult<()> {
    let path = Path::new(image_file);
    if image_file.trim().is_empty() {
        return Err(ServiceError::invalid("image_file is required"));
    }
    if !path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(ServiceError::invalid(
            "image_file must be a relative path inside the upload directory",
        ));
    }
    Ok(())
}
