// src/db/route_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{db_utils::push_patch, error::AppError},
    models::route::{Route, RouteFields, RoutePatch},
};

// Repositório da tabela 'routes'. Não guarda o pool: cada chamada recebe o executor.
#[derive(Clone, Default)]
pub struct RouteRepository;

impl RouteRepository {
    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Route>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let routes = sqlx::query_as::<_, Route>("SELECT * FROM routes ORDER BY created_at DESC")
            .fetch_all(executor)
            .await?;
        Ok(routes)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Route>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let route = sqlx::query_as::<_, Route>("SELECT * FROM routes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(route)
    }

    pub async fn create<'e, E>(&self, executor: E, fields: &RouteFields) -> Result<Route, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let route = sqlx::query_as::<_, Route>(
            r#"
            INSERT INTO routes (route, shift, warehouse, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.shift)
        .bind(&fields.warehouse)
        .bind(&fields.description)
        .fetch_one(executor)
        .await?;
        Ok(route)
    }

    /// UPDATE parcial: só as colunas presentes no patch são escritas.
    /// `None` quando o id não existe.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        patch: &RoutePatch,
    ) -> Result<Option<Route>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE routes SET updated_at = NOW()");
        push_patch(&mut builder, "route", &patch.route);
        push_patch(&mut builder, "shift", &patch.shift);
        push_patch(&mut builder, "warehouse", &patch.warehouse);
        push_patch(&mut builder, "description", &patch.description);
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        let route = builder
            .build_query_as::<Route>()
            .fetch_optional(executor)
            .await?;
        Ok(route)
    }

    /// Devolve quantas linhas foram apagadas (0 ou 1).
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
