// src/db/repository.rs
// DOCUMENTATION: Database access layer - all SQL queries
// PURPOSE: PostgreSQL implementation of PlaceStore

use crate::db::{check_permutation, PlaceStore, UpsertOutcome, UpsertResult};
use crate::errors::PlacesError;
use crate::models::{
    CreatePlaceRequest, Place, PlaceImage, PlaceSummary, UpdatePlaceRequest, PLACE_ADMIN,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const PLACE_COLUMNS: &str =
    "id, title, short_description, long_description, latitude, longitude, created_at, updated_at";

const IMAGE_COLUMNS: &str = "id, place_id, file_path, display_order, created_at";

/// Postgres error codes
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn error_code(e: &sqlx::Error) -> Option<String> {
    e.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code.into_owned())
}

/// Log and wrap a sqlx error
fn db_error(context: &str, e: sqlx::Error) -> PlacesError {
    log::error!("{}: {}", context, e);
    PlacesError::DatabaseError(format!("{}: {}", context, e))
}

/// Escape LIKE wildcards in user input
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// PlaceRepository: All database operations for places and images
/// DOCUMENTATION: Uses query_as for type-safe SQL queries
#[derive(Clone)]
pub struct PlaceRepository {
    pool: PgPool,
}

impl PlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceStore for PlaceRepository {
    async fn list_places(&self) -> Result<Vec<Place>, PlacesError> {
        let sql = format!("SELECT {} FROM places ORDER BY title", PLACE_COLUMNS);
        sqlx::query_as::<_, Place>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list places", e))
    }

    async fn get_place(&self, id: Uuid) -> Result<Place, PlacesError> {
        let sql = format!("SELECT {} FROM places WHERE id = $1", PLACE_COLUMNS);
        sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch place", e))?
            .ok_or_else(|| PlacesError::NotFound(format!("place {}", id)))
    }

    async fn upsert_place(
        &self,
        fields: &CreatePlaceRequest,
        force: bool,
    ) -> Result<UpsertResult, PlacesError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;

        // Insert first - on conflict do nothing so a concurrent import of the
        // same title falls through to the existing-row path
        let candidate = Place::new(fields);
        let insert_sql = format!(
            r#"
            INSERT INTO places (
                id, title, short_description, long_description,
                latitude, longitude, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (title) DO NOTHING
            RETURNING {}
            "#,
            PLACE_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Place>(&insert_sql)
            .bind(candidate.id)
            .bind(&candidate.title)
            .bind(&candidate.short_description)
            .bind(&candidate.long_description)
            .bind(candidate.latitude)
            .bind(candidate.longitude)
            .bind(candidate.created_at)
            .bind(candidate.updated_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to insert place", e))?;

        if let Some(place) = inserted {
            tx.commit()
                .await
                .map_err(|e| db_error("Failed to commit place insert", e))?;
            return Ok(UpsertResult {
                place,
                outcome: UpsertOutcome::Created,
                removed_images: Vec::new(),
            });
        }

        let select_sql = format!(
            "SELECT {} FROM places WHERE title = $1 FOR UPDATE",
            PLACE_COLUMNS
        );
        let existing = sqlx::query_as::<_, Place>(&select_sql)
            .bind(&fields.title)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock existing place", e))?;

        if !force {
            tx.commit()
                .await
                .map_err(|e| db_error("Failed to close transaction", e))?;
            return Ok(UpsertResult {
                place: existing,
                outcome: UpsertOutcome::Skipped,
                removed_images: Vec::new(),
            });
        }

        let update_sql = format!(
            r#"
            UPDATE places
            SET short_description = $1,
                long_description = $2,
                latitude = $3,
                longitude = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            PLACE_COLUMNS
        );
        let place = sqlx::query_as::<_, Place>(&update_sql)
            .bind(&fields.short_description)
            .bind(&fields.long_description)
            .bind(fields.latitude)
            .bind(fields.longitude)
            .bind(existing.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to overwrite place", e))?;

        let delete_sql = format!(
            "DELETE FROM place_images WHERE place_id = $1 RETURNING {}",
            IMAGE_COLUMNS
        );
        let removed_images = sqlx::query_as::<_, PlaceImage>(&delete_sql)
            .bind(place.id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to clear place images", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit place overwrite", e))?;

        Ok(UpsertResult {
            place,
            outcome: UpsertOutcome::Updated,
            removed_images,
        })
    }

    async fn create_place(&self, fields: &CreatePlaceRequest) -> Result<Place, PlacesError> {
        let candidate = Place::new(fields);
        let sql = format!(
            r#"
            INSERT INTO places (
                id, title, short_description, long_description,
                latitude, longitude, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PLACE_COLUMNS
        );

        let place = sqlx::query_as::<_, Place>(&sql)
            .bind(candidate.id)
            .bind(&candidate.title)
            .bind(&candidate.short_description)
            .bind(&candidate.long_description)
            .bind(candidate.latitude)
            .bind(candidate.longitude)
            .bind(candidate.created_at)
            .bind(candidate.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if error_code(&e).as_deref() == Some(UNIQUE_VIOLATION) {
                    PlacesError::AlreadyExists(fields.title.clone())
                } else {
                    db_error("Failed to create place", e)
                }
            })?;

        log::info!("Created place {} ({})", place.title, place.id);
        Ok(place)
    }

    async fn update_place(
        &self,
        id: Uuid,
        req: &UpdatePlaceRequest,
    ) -> Result<Place, PlacesError> {
        let sql = format!(
            r#"
            UPDATE places
            SET title = COALESCE($1, title),
                short_description = COALESCE($2, short_description),
                long_description = COALESCE($3, long_description),
                latitude = COALESCE($4, latitude),
                longitude = COALESCE($5, longitude),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            PLACE_COLUMNS
        );

        sqlx::query_as::<_, Place>(&sql)
            .bind(&req.title)
            .bind(&req.short_description)
            .bind(&req.long_description)
            .bind(req.latitude)
            .bind(req.longitude)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if error_code(&e).as_deref() == Some(UNIQUE_VIOLATION) {
                    PlacesError::AlreadyExists(req.title.clone().unwrap_or_default())
                } else {
                    db_error("Failed to update place", e)
                }
            })?
            .ok_or_else(|| PlacesError::NotFound(format!("place {}", id)))
    }

    async fn delete_place(&self, id: Uuid) -> Result<Vec<PlaceImage>, PlacesError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;

        // Explicit cascade; the FK also cascades but the deleted rows are needed
        // to clean up their blobs
        let delete_images_sql = format!(
            "DELETE FROM place_images WHERE place_id = $1 RETURNING {}",
            IMAGE_COLUMNS
        );
        let removed = sqlx::query_as::<_, PlaceImage>(&delete_images_sql)
            .bind(id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete place images", e))?;

        let result = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to delete place", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| db_error("Failed to roll back delete", e))?;
            return Err(PlacesError::NotFound(format!("place {}", id)));
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit place delete", e))?;

        log::info!("Deleted place {} with {} images", id, removed.len());
        Ok(removed)
    }

    async fn search_places(&self, query: Option<&str>) -> Result<Vec<PlaceSummary>, PlacesError> {
        let needle = query.map(str::trim).filter(|q| !q.is_empty());

        let filter = match needle {
            Some(_) => {
                let clauses: Vec<String> = PLACE_ADMIN
                    .search_fields
                    .iter()
                    .map(|field| format!("p.{} ILIKE $1 ESCAPE '\\'", field))
                    .collect();
                format!("WHERE {}", clauses.join(" OR "))
            }
            None => String::new(),
        };

        let sql = format!(
            r#"
            SELECT p.id, p.title, p.latitude, p.longitude, COUNT(i.id) AS images_count
            FROM places p
            LEFT JOIN place_images i ON i.place_id = p.id
            {}
            GROUP BY p.id
            ORDER BY p.title
            "#,
            filter
        );

        let mut q = sqlx::query_as::<_, PlaceSummary>(&sql);
        if let Some(needle) = needle {
            q = q.bind(like_pattern(needle));
        }

        q.fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to search places", e))
    }

    async fn list_images(&self, place_id: Uuid) -> Result<Vec<PlaceImage>, PlacesError> {
        let sql = format!(
            r#"
            SELECT {} FROM place_images
            WHERE place_id = $1
            ORDER BY display_order ASC, created_at ASC, id ASC
            "#,
            IMAGE_COLUMNS
        );

        sqlx::query_as::<_, PlaceImage>(&sql)
            .bind(place_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch place images", e))
    }

    async fn add_image(
        &self,
        place_id: Uuid,
        file_path: &str,
        display_order: i32,
    ) -> Result<PlaceImage, PlacesError> {
        let image = PlaceImage::new(place_id, file_path.to_string(), display_order);
        let sql = format!(
            r#"
            INSERT INTO place_images (id, place_id, file_path, display_order, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            IMAGE_COLUMNS
        );

        sqlx::query_as::<_, PlaceImage>(&sql)
            .bind(image.id)
            .bind(image.place_id)
            .bind(&image.file_path)
            .bind(image.display_order)
            .bind(image.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match error_code(&e).as_deref() {
                Some(FOREIGN_KEY_VIOLATION) => PlacesError::NotFound(format!("place {}", place_id)),
                Some(UNIQUE_VIOLATION) => PlacesError::AlreadyExists(format!(
                    "image order {} for place {}",
                    display_order, place_id
                )),
                _ => db_error("Failed to create place image", e),
            })
    }

    async fn next_image_order(&self, place_id: Uuid) -> Result<i32, PlacesError> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM place_images WHERE place_id = $1",
        )
        .bind(place_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute next image order", e))
    }

    async fn delete_image(&self, image_id: Uuid) -> Result<PlaceImage, PlacesError> {
        let sql = format!(
            "DELETE FROM place_images WHERE id = $1 RETURNING {}",
            IMAGE_COLUMNS
        );

        sqlx::query_as::<_, PlaceImage>(&sql)
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to delete place image", e))?
            .ok_or_else(|| PlacesError::NotFound(format!("image {}", image_id)))
    }

    async fn reorder_images(
        &self,
        place_id: Uuid,
        image_ids: &[Uuid],
    ) -> Result<Vec<PlaceImage>, PlacesError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to open transaction", e))?;

        // Let orders collide mid-transaction; checked again at commit
        sqlx::query("SET CONSTRAINTS place_images_place_order_key DEFERRED")
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to defer order constraint", e))?;

        let current: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM place_images WHERE place_id = $1 FOR UPDATE",
        )
        .bind(place_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock place images", e))?;

        check_permutation(&current, image_ids)?;

        for (order, image_id) in image_ids.iter().enumerate() {
            sqlx::query("UPDATE place_images SET display_order = $1 WHERE id = $2")
                .bind(order as i32)
                .bind(image_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to update image order", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit image reorder", e))?;

        self.list_images(place_id).await
    }
}
