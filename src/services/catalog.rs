//! Catalog management service: authors, genres, items, their links and labels

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, CreateGenre, Genre},
        item::{CreateItem, Item, ItemDetails, Label, LabelAvailability, UpdateItem},
        report::{CatalogEntry, ItemGenre},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // =========================================================================
    // AUTHORS & GENRES
    // =========================================================================

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        let created = self.repository.authors.create(&author).await?;
        tracing::info!("Created author {} ({})", created.id, created.last_name);
        Ok(created)
    }

    pub async fn get_author(&self, id: i64) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list().await
    }

    pub async fn delete_author(&self, id: i64) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author {}", id);
        Ok(())
    }

    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        let created = self.repository.genres.create(&genre).await?;
        tracing::info!("Created genre {} ({})", created.id, created.name);
        Ok(created)
    }

    pub async fn get_genre(&self, id: i64) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn delete_genre(&self, id: i64) -> AppResult<()> {
        self.repository.genres.delete(id).await?;
        tracing::info!("Deleted genre {}", id);
        Ok(())
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    pub async fn create_item(&self, item: CreateItem) -> AppResult<Item> {
        let created = self.repository.items.create(&item).await?;
        tracing::info!("Created item {} ({})", created.id, created.title);
        Ok(created)
    }

    pub async fn get_item(&self, id: i64) -> AppResult<Item> {
        self.repository.items.get_by_id(id).await
    }

    /// Item with its authors (link order), genres and labels
    pub async fn get_item_details(&self, id: i64) -> AppResult<ItemDetails> {
        let item = self.repository.items.get_by_id(id).await?;
        let authors = self.repository.items.get_item_authors(id).await?;
        let genres = self.repository.items.get_item_genres(id).await?;
        let labels = self.repository.items.get_item_labels(id).await?;

        Ok(ItemDetails {
            item,
            authors,
            genres,
            labels,
        })
    }

    pub async fn update_item(&self, id: i64, changes: UpdateItem) -> AppResult<Item> {
        let updated = self.repository.items.update(id, changes).await?;
        tracing::info!("Updated item {}", id);
        Ok(updated)
    }

    /// Delete an item; its labels go with it
    pub async fn delete_item(&self, id: i64) -> AppResult<()> {
        let labels = self.repository.items.delete(id).await?;
        tracing::info!("Deleted item {} and {} label(s)", id, labels);
        Ok(())
    }

    // =========================================================================
    // LINKS
    // =========================================================================

    pub async fn link_author(&self, item_id: i64, author_id: i64) -> AppResult<()> {
        if self.repository.items.link_author(item_id, author_id).await? {
            tracing::info!("Linked author {} to item {}", author_id, item_id);
        } else {
            tracing::debug!("Author {} already linked to item {}", author_id, item_id);
        }
        Ok(())
    }

    pub async fn unlink_author(&self, item_id: i64, author_id: i64) -> AppResult<()> {
        if self.repository.items.unlink_author(item_id, author_id).await? {
            tracing::info!("Unlinked author {} from item {}", author_id, item_id);
        }
        Ok(())
    }

    pub async fn link_genre(&self, item_id: i64, genre_id: i64) -> AppResult<()> {
        if self.repository.items.link_genre(item_id, genre_id).await? {
            tracing::info!("Linked genre {} to item {}", genre_id, item_id);
        } else {
            tracing::debug!("Genre {} already linked to item {}", genre_id, item_id);
        }
        Ok(())
    }

    pub async fn unlink_genre(&self, item_id: i64, genre_id: i64) -> AppResult<()> {
        if self.repository.items.unlink_genre(item_id, genre_id).await? {
            tracing::info!("Unlinked genre {} from item {}", genre_id, item_id);
        }
        Ok(())
    }

    // =========================================================================
    // LABELS
    // =========================================================================

    pub async fn create_label(&self, item_id: i64) -> AppResult<Label> {
        let label = self.repository.items.create_label(item_id).await?;
        tracing::info!("Created label {} for item {}", label.id, item_id);
        Ok(label)
    }

    pub async fn get_label(&self, id: i64) -> AppResult<Label> {
        self.repository.items.get_label(id).await
    }

    /// Retire a label that never circulated
    pub async fn delete_label(&self, id: i64) -> AppResult<()> {
        self.repository.items.delete_label(id).await?;
        tracing::info!("Retired label {}", id);
        Ok(())
    }

    pub async fn label_availability(&self, id: i64) -> AppResult<LabelAvailability> {
        self.repository.items.label_availability(id).await.inspect_err(warn_integrity)
    }

    pub async fn audit_label_statuses(&self) -> AppResult<Vec<LabelAvailability>> {
        let labels = self.repository.items.audit_labels().await.inspect_err(warn_integrity)?;
        tracing::debug!("Audited {} label(s)", labels.len());
        Ok(labels)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub async fn catalog_listing(&self) -> AppResult<Vec<CatalogEntry>> {
        self.repository.items.catalog_listing().await.inspect_err(warn_integrity)
    }

    pub async fn item_genres(&self) -> AppResult<Vec<ItemGenre>> {
        self.repository.items.item_genre_pairs().await.inspect_err(warn_integrity)
    }
}

pub(crate) fn warn_integrity(err: &AppError) {
    if let AppError::DataIntegrity(msg) = err {
        tracing::warn!("Integrity check failed: {}", msg);
    }
}
