// src/models/route.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{location::Location, patch::Patch, validate_not_blank};

/// Campos editáveis de uma rota. Compartilhados entre a linha do banco
/// e a cópia de trabalho do cliente.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RouteFields {
    #[serde(rename = "route")]
    #[sqlx(rename = "route")]
    #[schema(example = "Route 12")]
    pub name: String,

    #[schema(example = "AM")]
    pub shift: String,

    #[schema(example = "North")]
    pub warehouse: String,

    pub description: Option<String>,
}

impl RouteFields {
    /// Verdadeiro se algum campo tem conteúdo (linhas totalmente vazias são ignoradas no save).
    pub fn is_populated(&self) -> bool {
        [&self.name, &self.shift, &self.warehouse]
            .iter()
            .any(|v| !v.trim().is_empty())
            || self.description.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// Nomes dos campos obrigatórios que estão vazios.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("route");
        }
        if self.shift.trim().is_empty() {
            missing.push("shift");
        }
        if self.warehouse.trim().is_empty() {
            missing.push("warehouse");
        }
        missing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: i32,

    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: RouteFields,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resposta de `GET /api/routes?id=`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteWithLocations {
    #[serde(flatten)]
    pub route: Route,
    pub locations: Vec<Location>,
}

// ---
// Payload: CreateRoute
// ---
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRoutePayload {
    // `default` faz o campo ausente cair na validação (400) em vez de erro de JSON.
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "The 'route' field is required."))]
    pub route: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "The 'shift' field is required."))]
    pub shift: String,

    #[serde(default)]
    #[validate(custom(function = "validate_not_blank", message = "The 'warehouse' field is required."))]
    pub warehouse: String,

    pub description: Option<String>,
}

impl From<&RouteFields> for CreateRoutePayload {
    fn from(fields: &RouteFields) -> Self {
        Self {
            route: fields.name.clone(),
            shift: fields.shift.clone(),
            warehouse: fields.warehouse.clone(),
            description: fields.description.clone(),
        }
    }
}

/// Atualização parcial de rota. Só os campos presentes são escritos.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct RoutePatch {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub route: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub shift: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub warehouse: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
}

impl RoutePatch {
    pub fn is_empty(&self) -> bool {
        self.route.is_absent()
            && self.shift.is_absent()
            && self.warehouse.is_absent()
            && self.description.is_absent()
    }

    pub fn apply_to(&self, fields: &mut RouteFields) {
        self.route.apply_required(&mut fields.name);
        self.shift.apply_required(&mut fields.shift);
        self.warehouse.apply_required(&mut fields.warehouse);
        self.description.apply_to(&mut fields.description);
    }

    /// Patch esparso que leva `old` até `new`.
    pub fn between(old: &RouteFields, new: &RouteFields) -> Self {
        Self {
            route: Patch::changed(&old.name, &new.name),
            shift: Patch::changed(&old.shift, &new.shift),
            warehouse: Patch::changed(&old.warehouse, &new.warehouse),
            description: Patch::between(&old.description, &new.description),
        }
    }
}

/// Uma entrada de `PUT /api/routes` em lote: `{ "id": 1, ...patch }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RouteBatchEntry {
    pub id: Option<i32>,

    #[serde(flatten)]
    pub patch: RoutePatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> RouteFields {
        RouteFields {
            name: "Route 7".into(),
            shift: "PM".into(),
            warehouse: "South".into(),
            description: None,
        }
    }

    #[test]
    fn description_patch_leaves_other_fields_alone() {
        let patch: RoutePatch = serde_json::from_value(json!({ "description": "x" })).unwrap();
        let mut current = fields();
        patch.apply_to(&mut current);

        assert_eq!(current.name, "Route 7");
        assert_eq!(current.shift, "PM");
        assert_eq!(current.warehouse, "South");
        assert_eq!(current.description.as_deref(), Some("x"));
    }

    #[test]
    fn batch_entry_reads_id_and_sparse_fields() {
        let entry: RouteBatchEntry =
            serde_json::from_value(json!({ "id": 4, "shift": "AM", "description": null })).unwrap();

        assert_eq!(entry.id, Some(4));
        assert_eq!(entry.patch.shift, Patch::Set("AM".to_string()));
        assert_eq!(entry.patch.description, Patch::Null);
        assert!(entry.patch.route.is_absent());
    }

    #[test]
    fn create_payload_rejects_blank_fields() {
        let payload: CreateRoutePayload =
            serde_json::from_value(json!({ "route": "R1", "shift": "  ", "warehouse": "W" })).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("shift"));

        let payload: CreateRoutePayload =
            serde_json::from_value(json!({ "shift": "AM", "warehouse": "W" })).unwrap();
        assert!(payload.validate().is_err());

        let payload: CreateRoutePayload =
            serde_json::from_value(json!({ "route": "R1", "shift": "AM", "warehouse": "W" })).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn route_json_uses_wire_names() {
        let value = json!({
            "id": 1,
            "route": "R1",
            "shift": "AM",
            "warehouse": "W",
            "description": null,
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        let route: Route = serde_json::from_value(value).unwrap();
        assert_eq!(route.fields.name, "R1");

        let back = serde_json::to_value(&route).unwrap();
        assert_eq!(back["route"], "R1");
        assert!(back.get("createdAt").is_some());
    }

    #[test]
    fn between_is_empty_for_identical_fields() {
        assert!(RoutePatch::between(&fields(), &fields()).is_empty());

        let mut edited = fields();
        edited.name = "Route 8".into();
        let patch = RoutePatch::between(&fields(), &edited);
        assert_eq!(patch.route, Patch::Set("Route 8".to_string()));
        assert!(patch.shift.is_absent());
    }
}
