// src/services/normalize.rs
//
// Regras comuns de limpeza dos patches antes de ir para o banco.

use crate::{
    common::error::AppError,
    models::{LocationFields, LocationPatch, Patch, RouteFields, RoutePatch},
};

/// Campo obrigatório: não pode ser apagado nem ficar em branco. Valor vai trimado.
pub fn required_text(field: &'static str, patch: &Patch<String>) -> Result<Patch<String>, AppError> {
    match patch {
        Patch::Absent => Ok(Patch::Absent),
        Patch::Null => Err(AppError::invalid_field(
            field,
            format!("The '{}' field cannot be cleared.", field),
        )),
        Patch::Set(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(AppError::invalid_field(
                    field,
                    format!("The '{}' field cannot be empty.", field),
                ));
            }
            Ok(Patch::Set(trimmed.to_string()))
        }
    }
}

/// Texto opcional: branco vira `NULL`.
pub fn optional_text(patch: &Patch<String>) -> Patch<String> {
    match patch {
        Patch::Set(value) if value.trim().is_empty() => Patch::Null,
        other => other.clone(),
    }
}

pub fn optional_value(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn route_fields(fields: &RouteFields) -> RouteFields {
    RouteFields {
        name: fields.name.trim().to_string(),
        shift: fields.shift.trim().to_string(),
        warehouse: fields.warehouse.trim().to_string(),
        description: optional_value(&fields.description),
    }
}

pub fn route_patch(patch: &RoutePatch) -> Result<RoutePatch, AppError> {
    Ok(RoutePatch {
        route: required_text("route", &patch.route)?,
        shift: required_text("shift", &patch.shift)?,
        warehouse: required_text("warehouse", &patch.warehouse)?,
        description: optional_text(&patch.description),
    })
}

pub fn location_fields(fields: &LocationFields) -> LocationFields {
    LocationFields {
        name: fields.name.trim().to_string(),
        code: optional_value(&fields.code),
        delivery: optional_value(&fields.delivery),
        power_mode: optional_value(&fields.power_mode),
        description: optional_value(&fields.description),
        address: optional_value(&fields.address),
        website_link: optional_value(&fields.website_link),
        qr_code_image: optional_value(&fields.qr_code_image),
        qr_code_destination_url: optional_value(&fields.qr_code_destination_url),
        marker_color: optional_value(&fields.marker_color),
        ..fields.clone()
    }
}

pub fn location_patch(patch: &LocationPatch) -> Result<LocationPatch, AppError> {
    let route_id = match patch.route_id {
        Patch::Null => {
            return Err(AppError::invalid_field("routeId", "The 'routeId' field cannot be cleared."));
        }
        Patch::Set(id) if id < 0 => {
            return Err(AppError::invalid_field(
                "routeId",
                "The 'routeId' must be a non-negative integer.",
            ));
        }
        ref other => other.clone(),
    };

    Ok(LocationPatch {
        route_id,
        location: required_text("location", &patch.location)?,
        code: optional_text(&patch.code),
        delivery: optional_text(&patch.delivery),
        power_mode: optional_text(&patch.power_mode),
        description: optional_text(&patch.description),
        address: optional_text(&patch.address),
        website_link: optional_text(&patch.website_link),
        qr_code_image: optional_text(&patch.qr_code_image),
        qr_code_destination_url: optional_text(&patch.qr_code_destination_url),
        marker_color: optional_text(&patch.marker_color),
        ..patch.clone()
    })
}
