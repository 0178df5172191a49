// src/services/location_service.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    db::LocationRepository,
    models::{
        location::{remove_first_image, CreateLocationPayload},
        BatchOutcome, Location, LocationBatchEntry, LocationPatch,
    },
    services::normalize,
};

#[derive(Clone, Default)]
pub struct LocationService {
    location_repo: LocationRepository,
}

impl LocationService {
    // ---
    // Leitura
    // ---

    pub async fn list_locations<'e, E>(&self, executor: E) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.location_repo.list_all(executor).await
    }

    pub async fn list_by_route<'e, E>(
        &self,
        executor: E,
        route_id: i32,
    ) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.location_repo.list_by_route(executor, route_id).await
    }

    pub async fn get_location<'e, E>(&self, executor: E, id: i32) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.location_repo
            .find_by_id(executor, id)
            .await?
            .ok_or(AppError::LocationNotFound(id))
    }

    // ---
    // Escrita
    // ---

    pub async fn create_location<'e, E>(
        &self,
        executor: E,
        payload: &CreateLocationPayload,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let route_id = payload.validate_required()?;
        let fields = normalize::location_fields(&payload.fields);
        let images: Vec<String> = payload
            .images
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        let location = self
            .location_repo
            .create(executor, route_id, &fields, &images)
            .await?;
        tracing::info!(location_id = location.id, route_id, "location created");
        Ok(location)
    }

    pub async fn update_location<'e, E>(
        &self,
        executor: E,
        id: i32,
        patch: &LocationPatch,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let patch = normalize::location_patch(patch)?;

        self.location_repo
            .update(executor, id, &patch)
            .await?
            .ok_or(AppError::LocationNotFound(id))
    }

    pub async fn batch_update_locations(
        &self,
        pool: &PgPool,
        entries: &[LocationBatchEntry],
    ) -> BatchOutcome<Location> {
        let mut outcome = BatchOutcome::default();

        for entry in entries {
            let result = match entry.id {
                Some(id) => self.update_location(pool, id, &entry.patch).await,
                None => Err(AppError::BadRequest("Missing id".to_string())),
            };
            if let Err(e) = &result {
                tracing::warn!(location_id = ?entry.id, "batch location update failed: {}", e);
            }
            outcome.record(entry.id, result);
        }

        tracing::info!(
            updated = outcome.updated,
            failed = outcome.failed,
            "batch location update finished"
        );
        outcome
    }

    // --- IMAGENS ---

    pub async fn add_image<'e, E>(&self, executor: E, id: i32, url: &str) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::invalid_field("imageUrl", "The 'imageUrl' field is required."));
        }

        self.location_repo
            .append_image(executor, id, url)
            .await?
            .ok_or(AppError::LocationNotFound(id))
    }

    /// Remove a primeira ocorrência exata da URL (ler-modificar-escrever com a linha travada).
    pub async fn remove_image(&self, pool: &PgPool, id: i32, url: &str) -> Result<Location, AppError> {
        let mut tx = pool.begin().await?;

        let mut location = self
            .location_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::LocationNotFound(id))?;

        if remove_first_image(&mut location.images, url) {
            location = self
                .location_repo
                .set_images(&mut *tx, id, &location.images)
                .await?;
        } else {
            tracing::debug!(location_id = id, "image url not in list; nothing removed");
        }

        tx.commit().await?;
        Ok(location)
    }

    pub async fn delete_location<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let removed = self.location_repo.delete(executor, id).await?;
        if removed == 0 {
            return Err(AppError::LocationNotFound(id));
        }
        tracing::info!(location_id = id, "location deleted");
        Ok(())
    }
}
