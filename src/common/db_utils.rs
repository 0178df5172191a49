use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{common::error::AppError, config::AppState, models::Patch};

// ---
// Helper: acesso ao pool
// ---
/// Sem pool, toda requisição de dados responde "Database not connected".
pub(crate) fn require_pool(app_state: &AppState) -> Result<&PgPool, AppError> {
    app_state.db_pool.as_ref().ok_or(AppError::DatabaseNotConnected)
}

// ---
// Helper: UPDATE parcial
// ---
/// Acrescenta `, coluna = $n` ao UPDATE somente quando o patch traz o campo.
/// `Patch::Null` vira `NULL`; `Patch::Absent` não escreve nada.
pub(crate) fn push_patch<'a, T>(
    builder: &mut QueryBuilder<'a, Postgres>,
    column: &str,
    patch: &Patch<T>,
) where
    T: Clone + Send + 'a + sqlx::Encode<'a, Postgres> + sqlx::Type<Postgres>,
{
    if let Some(value) = patch.as_write() {
        builder.push(", ");
        builder.push(column);
        builder.push(" = ");
        builder.push_bind(value.cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_present_fields_reach_the_statement() {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE routes SET updated_at = NOW()");
        push_patch(&mut builder, "route", &Patch::<String>::Absent);
        push_patch(&mut builder, "description", &Patch::<String>::Null);
        push_patch(&mut builder, "shift", &Patch::Set("AM".to_string()));
        builder.push(" WHERE id = ");
        builder.push_bind(1_i32);

        assert_eq!(
            builder.sql(),
            "UPDATE routes SET updated_at = NOW(), description = $1, shift = $2 WHERE id = $3"
        );
    }
}
