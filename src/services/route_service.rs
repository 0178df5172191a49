// src/services/route_service.rs

use sqlx::{Executor, PgPool, Postgres};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{LocationRepository, RouteRepository},
    models::{
        BatchOutcome, CreateRoutePayload, Route, RouteBatchEntry, RouteFields, RoutePatch,
        RouteWithLocations,
    },
    services::normalize,
};

#[derive(Clone, Default)]
pub struct RouteService {
    route_repo: RouteRepository,
    location_repo: LocationRepository,
}

impl RouteService {
    pub async fn list_routes<'e, E>(&self, executor: E) -> Result<Vec<Route>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.route_repo.list(executor).await
    }

    /// Rota + seus pontos (mais recentes primeiro).
    pub async fn get_route(&self, pool: &PgPool, id: i32) -> Result<RouteWithLocations, AppError> {
        let route = self
            .route_repo
            .find_by_id(pool, id)
            .await?
            .ok_or(AppError::RouteNotFound(id))?;

        let locations = self.location_repo.list_by_route(pool, id).await?;

        Ok(RouteWithLocations { route, locations })
    }

    // --- CREATE ---
    pub async fn create_route<'e, E>(
        &self,
        executor: E,
        payload: &CreateRoutePayload,
    ) -> Result<Route, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Nenhum INSERT acontece se a validação falhar.
        payload.validate()?;

        let fields = normalize::route_fields(&RouteFields {
            name: payload.route.clone(),
            shift: payload.shift.clone(),
            warehouse: payload.warehouse.clone(),
            description: payload.description.clone(),
        });

        let route = self.route_repo.create(executor, &fields).await?;
        tracing::info!(route_id = route.id, "route created");
        Ok(route)
    }

    // --- UPDATE (parcial) ---
    pub async fn update_route<'e, E>(
        &self,
        executor: E,
        id: i32,
        patch: &RoutePatch,
    ) -> Result<Route, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let patch = normalize::route_patch(patch)?;

        self.route_repo
            .update(executor, id, &patch)
            .await?
            .ok_or(AppError::RouteNotFound(id))
    }

    /// Cada entrada é aplicada de forma independente; uma falha não aborta as demais.
    pub async fn batch_update_routes(
        &self,
        pool: &PgPool,
        entries: &[RouteBatchEntry],
    ) -> BatchOutcome<Route> {
        let mut outcome = BatchOutcome::default();

        for entry in entries {
            let result = match entry.id {
                Some(id) => self.update_route(pool, id, &entry.patch).await,
                None => Err(AppError::BadRequest("Missing id".to_string())),
            };
            if let Err(e) = &result {
                tracing::warn!(route_id = ?entry.id, "batch route update failed: {}", e);
            }
            outcome.record(entry.id, result);
        }

        tracing::info!(
            updated = outcome.updated,
            failed = outcome.failed,
            "batch route update finished"
        );
        outcome
    }

    // --- DELETE (em cascata) ---
    /// Apaga os pontos da rota e depois a rota, na mesma transação.
    /// Devolve quantos pontos foram removidos.
    pub async fn delete_route(&self, pool: &PgPool, id: i32) -> Result<u64, AppError> {
        let mut tx = pool.begin().await?;

        let removed_locations = self.location_repo.delete_by_route(&mut *tx, id).await?;
        let removed_routes = self.route_repo.delete(&mut *tx, id).await?;

        if removed_routes == 0 {
            tx.rollback().await?;
            return Err(AppError::RouteNotFound(id));
        }

        tx.commit().await?;
        tracing::info!(route_id = id, removed_locations, "route deleted");
        Ok(removed_locations)
    }
}

// Rodam contra um Postgres real: `DATABASE_URL=... cargo test -- --ignored`.
// Cada teste recebe um banco novo com as migrations aplicadas.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{location::CreateLocationPayload, LocationFields, Patch};
    use crate::services::LocationService;

    fn payload(route: &str, shift: &str, warehouse: &str) -> CreateRoutePayload {
        CreateRoutePayload {
            route: route.into(),
            shift: shift.into(),
            warehouse: warehouse.into(),
            description: None,
        }
    }

    async fn count(pool: &PgPool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn add_stop(pool: &PgPool, route_id: i32, name: &str) -> i32 {
        let payload = CreateLocationPayload {
            route_id: Some(route_id.into()),
            fields: LocationFields {
                name: name.into(),
                ..Default::default()
            },
            images: Vec::new(),
        };
        LocationService::default()
            .create_location(pool, &payload)
            .await
            .unwrap()
            .id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn blank_field_inserts_nothing(pool: PgPool) {
        let service = RouteService::default();

        let result = service.create_route(&pool, &payload("R1", "AM", "   ")).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(count(&pool, "routes").await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn create_trims_and_stores_blank_description_as_null(pool: PgPool) {
        let service = RouteService::default();
        let mut input = payload("  R1 ", "AM", "North");
        input.description = Some("  ".into());

        let route = service.create_route(&pool, &input).await.unwrap();

        assert_eq!(route.fields.name, "R1");
        assert_eq!(route.fields.description, None);
        assert_eq!(service.list_routes(&pool).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn description_update_keeps_other_columns(pool: PgPool) {
        let service = RouteService::default();
        let created = service.create_route(&pool, &payload("R1", "AM", "North")).await.unwrap();

        let patch = RoutePatch {
            description: Patch::Set("Night".into()),
            ..Default::default()
        };
        let updated = service.update_route(&pool, created.id, &patch).await.unwrap();

        assert_eq!(updated.fields.name, "R1");
        assert_eq!(updated.fields.shift, "AM");
        assert_eq!(updated.fields.warehouse, "North");
        assert_eq!(updated.fields.description.as_deref(), Some("Night"));
        assert!(updated.updated_at >= created.updated_at);

        let cleared = RoutePatch {
            description: Patch::Null,
            ..Default::default()
        };
        let updated = service.update_route(&pool, created.id, &cleared).await.unwrap();
        assert_eq!(updated.fields.description, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn clearing_a_required_column_is_rejected(pool: PgPool) {
        let service = RouteService::default();
        let created = service.create_route(&pool, &payload("R1", "AM", "North")).await.unwrap();

        let patch = RoutePatch {
            shift: Patch::Null,
            ..Default::default()
        };
        let result = service.update_route(&pool, created.id, &patch).await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(service.get_route(&pool, created.id).await.unwrap().route.fields.shift, "AM");
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn update_of_missing_route_is_not_found(pool: PgPool) {
        let patch = RoutePatch {
            description: Patch::Set("x".into()),
            ..Default::default()
        };
        let result = RouteService::default().update_route(&pool, 4242, &patch).await;

        assert!(matches!(result, Err(AppError::RouteNotFound(4242))));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn delete_cascades_and_second_delete_is_not_found(pool: PgPool) {
        let service = RouteService::default();
        let doomed = service.create_route(&pool, &payload("R1", "AM", "North")).await.unwrap();
        let kept = service.create_route(&pool, &payload("R2", "PM", "South")).await.unwrap();
        add_stop(&pool, doomed.id, "A").await;
        add_stop(&pool, doomed.id, "B").await;
        add_stop(&pool, kept.id, "C").await;

        let fetched = service.get_route(&pool, doomed.id).await.unwrap();
        assert_eq!(fetched.locations.len(), 2);

        assert_eq!(service.delete_route(&pool, doomed.id).await.unwrap(), 2);
        assert_eq!(count(&pool, "locations").await, 1);
        assert_eq!(count(&pool, "routes").await, 1);

        let again = service.delete_route(&pool, doomed.id).await;
        assert!(matches!(again, Err(AppError::RouteNotFound(_))));
        assert!(matches!(
            service.get_route(&pool, doomed.id).await,
            Err(AppError::RouteNotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn batch_reports_each_entry(pool: PgPool) {
        let service = RouteService::default();
        let a = service.create_route(&pool, &payload("A", "AM", "North")).await.unwrap();
        let b = service.create_route(&pool, &payload("B", "AM", "North")).await.unwrap();

        let entry = |id: i32, shift: &str| RouteBatchEntry {
            id: Some(id),
            patch: RoutePatch {
                shift: Patch::Set(shift.into()),
                ..Default::default()
            },
        };
        let entries = vec![entry(a.id, "PM"), entry(9999, "PM"), entry(b.id, "Night")];

        let outcome = service.batch_update_routes(&pool, &entries).await;

        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.failed_ids(), vec![9999]);
        assert_eq!(service.get_route(&pool, a.id).await.unwrap().route.fields.shift, "PM");
        assert_eq!(service.get_route(&pool, b.id).await.unwrap().route.fields.shift, "Night");
    }
}
