// src/db/location_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{db_utils::push_patch, error::AppError},
    models::location::{Location, LocationFields, LocationPatch},
};

#[derive(Clone, Default)]
pub struct LocationRepository;

impl LocationRepository {
    // ---
    // Leitura
    // ---

    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locations =
            sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY created_at DESC")
                .fetch_all(executor)
                .await?;
        Ok(locations)
    }

    pub async fn list_by_route<'e, E>(
        &self,
        executor: E,
        route_id: i32,
    ) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE route_id = $1 ORDER BY created_at DESC",
        )
        .bind(route_id)
        .fetch_all(executor)
        .await?;
        Ok(locations)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(location)
    }

    /// Trava a linha até o fim da transação (usado na remoção de imagem).
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: i32,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location =
            sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(location)
    }

    // ---
    // Escrita
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        route_id: i32,
        fields: &LocationFields,
        images: &[String],
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (
                route_id, location, code, seq_no, delivery, power_mode,
                latitude, longitude, description, address, images,
                website_link, qr_code_image, qr_code_destination_url, marker_color
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(route_id)
        .bind(&fields.name)
        .bind(&fields.code)
        .bind(fields.no)
        .bind(&fields.delivery)
        .bind(&fields.power_mode)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(&fields.description)
        .bind(&fields.address)
        .bind(images)
        .bind(&fields.website_link)
        .bind(&fields.qr_code_image)
        .bind(&fields.qr_code_destination_url)
        .bind(&fields.marker_color)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // FK violada: a rota não existe
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::RouteNotFound(route_id);
                }
            }
            e.into()
        })?;
        Ok(location)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        patch: &LocationPatch,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE locations SET updated_at = NOW()");
        push_patch(&mut builder, "route_id", &patch.route_id);
        push_patch(&mut builder, "location", &patch.location);
        push_patch(&mut builder, "code", &patch.code);
        push_patch(&mut builder, "seq_no", &patch.no);
        push_patch(&mut builder, "delivery", &patch.delivery);
        push_patch(&mut builder, "power_mode", &patch.power_mode);
        push_patch(&mut builder, "latitude", &patch.latitude);
        push_patch(&mut builder, "longitude", &patch.longitude);
        push_patch(&mut builder, "description", &patch.description);
        push_patch(&mut builder, "address", &patch.address);
        push_patch(&mut builder, "website_link", &patch.website_link);
        push_patch(&mut builder, "qr_code_image", &patch.qr_code_image);
        push_patch(&mut builder, "qr_code_destination_url", &patch.qr_code_destination_url);
        push_patch(&mut builder, "marker_color", &patch.marker_color);
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        let location = builder
            .build_query_as::<Location>()
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                if let (sqlx::Error::Database(db_err), Some(Some(route_id))) =
                    (&e, patch.route_id.as_write())
                {
                    if db_err.is_foreign_key_violation() {
                        return AppError::RouteNotFound(*route_id);
                    }
                }
                AppError::from(e)
            })?;
        Ok(location)
    }

    /// `array_append` atômico; lista ausente conta como vazia.
    pub async fn append_image<'e, E>(
        &self,
        executor: E,
        id: i32,
        url: &str,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations
            SET images = array_append(COALESCE(images, '{}'::TEXT[]), $2),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(url)
        .fetch_optional(executor)
        .await?;
        Ok(location)
    }

    pub async fn set_images<'e, E>(
        &self,
        executor: E,
        id: i32,
        images: &[String],
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>(
            "UPDATE locations SET images = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(images)
        .fetch_one(executor)
        .await?;
        Ok(location)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_route<'e, E>(&self, executor: E, route_id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM locations WHERE route_id = $1")
            .bind(route_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
