//! Items repository: catalog works, their author/genre links and labels

use sqlx::{Pool, Row, Sqlite};

use crate::{
    db,
    error::{AppError, AppResult},
    models::{
        author::{Author, Genre},
        item::{CreateItem, Item, Label, LabelAvailability, LabelStatus, UpdateItem},
        report::{CatalogEntry, ItemGenre},
        Table,
    },
    rules::{
        self,
        record,
        store::{self, UniqueField},
    },
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Sqlite>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn check(item: &CreateItem) -> AppResult<()> {
        rules::check_fields("item", item)?;
        record::item_pages(item.pages)
    }

    // =========================================================================
    // ITEMS
    // =========================================================================

    /// Get item by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))
    }

    /// Create a new item
    pub async fn create(&self, item: &CreateItem) -> AppResult<Item> {
        Self::check(item)?;

        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_unique(&mut tx, UniqueField::ItemCode, item.code.as_deref(), None).await?;

        let created = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (title, item_type, publisher, language, code, pages)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(item.title.trim())
        .bind(&item.item_type)
        .bind(&item.publisher)
        .bind(&item.language)
        .bind(&item.code)
        .bind(item.pages)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Update an item; the merged record is re-checked
    pub async fn update(&self, id: i64, changes: UpdateItem) -> AppResult<Item> {
        let mut tx = db::begin_write(&self.pool).await?;

        let current = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", id)))?;

        let candidate = changes.merge(current);
        Self::check(&candidate)?;
        store::ensure_unique(&mut tx, UniqueField::ItemCode, candidate.code.as_deref(), Some(id)).await?;

        let updated = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET title = ?, item_type = ?, publisher = ?, language = ?, code = ?, pages = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(candidate.title.trim())
        .bind(&candidate.item_type)
        .bind(&candidate.publisher)
        .bind(&candidate.language)
        .bind(&candidate.code)
        .bind(candidate.pages)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an item together with its labels and links.
    ///
    /// Returns the number of labels removed. Fails when any label carries loan
    /// history, since loans are never deleted.
    pub async fn delete(&self, id: i64) -> AppResult<u64> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_found(&mut tx, Table::Items, id).await?;

        let loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans l JOIN labels lb ON lb.id = l.label_id WHERE lb.item_id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if loans > 0 {
            return Err(AppError::ReferentialIntegrity(format!(
                "Item {} has labels with {} loan(s)",
                id, loans
            )));
        }

        let labels = sqlx::query("DELETE FROM labels WHERE item_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(labels)
    }

    // =========================================================================
    // ASSOCIATIONS
    // =========================================================================

    /// Link an author to an item. Returns `false` when the pair was already
    /// linked. New links go after the existing ones.
    pub async fn link_author(&self, item_id: i64, author_id: i64) -> AppResult<bool> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_referenced(&mut tx, Table::Items, item_id).await?;
        store::ensure_referenced(&mut tx, Table::Authors, author_id).await?;

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO items_authors (item_id, author_id, position)
            VALUES (?, ?, (SELECT COALESCE(MAX(position), 0) + 1 FROM items_authors WHERE item_id = ?))
            "#,
        )
        .bind(item_id)
        .bind(author_id)
        .bind(item_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(inserted > 0)
    }

    /// Remove the link row only. Returns `false` when there was none.
    pub async fn unlink_author(&self, item_id: i64, author_id: i64) -> AppResult<bool> {
        let removed = sqlx::query("DELETE FROM items_authors WHERE item_id = ? AND author_id = ?")
            .bind(item_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    pub async fn link_genre(&self, item_id: i64, genre_id: i64) -> AppResult<bool> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_referenced(&mut tx, Table::Items, item_id).await?;
        store::ensure_referenced(&mut tx, Table::Genres, genre_id).await?;

        let inserted = sqlx::query("INSERT OR IGNORE INTO items_genres (item_id, genre_id) VALUES (?, ?)")
            .bind(item_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(inserted > 0)
    }

    pub async fn unlink_genre(&self, item_id: i64, genre_id: i64) -> AppResult<bool> {
        let removed = sqlx::query("DELETE FROM items_genres WHERE item_id = ? AND genre_id = ?")
            .bind(item_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    /// Authors of an item in link order
    pub async fn get_item_authors(&self, item_id: i64) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.*
            FROM items_authors ia
            JOIN authors a ON a.id = ia.author_id
            WHERE ia.item_id = ?
            ORDER BY ia.position
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    pub async fn get_item_genres(&self, item_id: i64) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.*
            FROM items_genres ig
            JOIN genres g ON g.id = ig.genre_id
            WHERE ig.item_id = ?
            ORDER BY g.id
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    // =========================================================================
    // LABELS
    // =========================================================================

    /// Register a new physical copy of an item
    pub async fn create_label(&self, item_id: i64) -> AppResult<Label> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_referenced(&mut tx, Table::Items, item_id).await?;

        let label = sqlx::query_as::<_, Label>(
            "INSERT INTO labels (item_id, status) VALUES (?, ?) RETURNING *",
        )
        .bind(item_id)
        .bind(LabelStatus::Available.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(label)
    }

    pub async fn get_label(&self, id: i64) -> AppResult<Label> {
        sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Label with id {} not found", id)))
    }

    pub async fn get_item_labels(&self, item_id: i64) -> AppResult<Vec<Label>> {
        let labels = sqlx::query_as::<_, Label>("SELECT * FROM labels WHERE item_id = ? ORDER BY id")
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(labels)
    }

    /// Retire a label that never circulated
    pub async fn delete_label(&self, id: i64) -> AppResult<()> {
        let mut tx = db::begin_write(&self.pool).await?;
        store::ensure_found(&mut tx, Table::Labels, id).await?;
        store::ensure_unreferenced(&mut tx, Table::Labels, id, Table::Loans, "label_id").await?;

        sqlx::query("DELETE FROM labels WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Stored status of one label checked against its loan history
    pub async fn label_availability(&self, id: i64) -> AppResult<LabelAvailability> {
        let row = sqlx::query(
            r#"
            SELECT lb.id, lb.item_id, lb.status,
                   (SELECT COUNT(*) FROM loans l
                    WHERE l.label_id = lb.id AND l.returned_date IS NULL) AS open_loans
            FROM labels lb
            WHERE lb.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Label with id {} not found", id)))?;

        availability_from_row(&row)
    }

    /// Check every label's stored status against its loan history
    pub async fn audit_labels(&self) -> AppResult<Vec<LabelAvailability>> {
        let rows = sqlx::query(
            r#"
            SELECT lb.id, lb.item_id, lb.status,
                   (SELECT COUNT(*) FROM loans l
                    WHERE l.label_id = lb.id AND l.returned_date IS NULL) AS open_loans
            FROM labels lb
            ORDER BY lb.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(availability_from_row).collect()
    }

    // =========================================================================
    // CATALOG QUERIES
    // =========================================================================

    /// Every item with the last names of its authors, in link order
    pub async fn catalog_listing(&self) -> AppResult<Vec<CatalogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id AS item_id, i.title, ia.author_id, a.last_name
            FROM items i
            LEFT JOIN items_authors ia ON ia.item_id = i.id
            LEFT JOIN authors a ON a.id = ia.author_id
            ORDER BY i.id, ia.position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries: Vec<CatalogEntry> = Vec::new();
        for row in rows {
            let item_id: i64 = row.try_get("item_id")?;
            let author_id: Option<i64> = row.try_get("author_id")?;
            let last_name: Option<String> = row.try_get("last_name")?;

            if entries.last().map(|e| e.item_id) != Some(item_id) {
                entries.push(CatalogEntry {
                    item_id,
                    title: row.try_get("title")?,
                    authors: Vec::new(),
                });
            }

            match (author_id, last_name) {
                (Some(_), Some(name)) => {
                    if let Some(entry) = entries.last_mut() {
                        entry.authors.push(name);
                    }
                }
                (Some(author_id), None) => {
                    return Err(AppError::DataIntegrity(format!(
                        "Item {} is linked to missing author {}",
                        item_id, author_id
                    )));
                }
                _ => {}
            }
        }

        Ok(entries)
    }

    /// One row per (item, genre) pair; items without genres do not appear
    pub async fn item_genre_pairs(&self) -> AppResult<Vec<ItemGenre>> {
        let rows = sqlx::query(
            r#"
            SELECT ig.item_id, ig.genre_id, i.title, g.name AS genre_name
            FROM items_genres ig
            LEFT JOIN items i ON i.id = ig.item_id
            LEFT JOIN genres g ON g.id = ig.genre_id
            ORDER BY ig.item_id, ig.genre_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> AppResult<ItemGenre> {
                let item_id: i64 = row.try_get("item_id")?;
                let genre_id: i64 = row.try_get("genre_id")?;
                let title: Option<String> = row.try_get("title")?;
                let genre_name: Option<String> = row.try_get("genre_name")?;

                let title = title.ok_or_else(|| {
                    AppError::DataIntegrity(format!(
                        "Genre {} is linked to missing item {}",
                        genre_id, item_id
                    ))
                })?;
                let genre_name = genre_name.ok_or_else(|| {
                    AppError::DataIntegrity(format!(
                        "Item {} is linked to missing genre {}",
                        item_id, genre_id
                    ))
                })?;

                Ok(ItemGenre {
                    item_id,
                    title,
                    genre_id,
                    genre_name,
                })
            })
            .collect()
    }
}

fn availability_from_row(row: &sqlx::sqlite::SqliteRow) -> AppResult<LabelAvailability> {
    let label_id: i64 = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let open_loans: i64 = row.try_get("open_loans")?;

    let stored_status: LabelStatus = status.parse().map_err(|_| {
        AppError::DataIntegrity(format!("Label {} has unknown status '{}'", label_id, status))
    })?;

    if open_loans > 1 {
        return Err(AppError::DataIntegrity(format!(
            "Label {} has {} open loans",
            label_id, open_loans
        )));
    }

    let derived = LabelStatus::from_open_loans(open_loans);
    if stored_status != derived {
        return Err(AppError::DataIntegrity(format!(
            "Label {} is stored as '{}' but its loan history says '{}'",
            label_id, stored_status, derived
        )));
    }

    Ok(LabelAvailability {
        label_id,
        item_id: row.try_get("item_id")?,
        stored_status,
        open_loans,
        available: derived == LabelStatus::Available,
    })
}
