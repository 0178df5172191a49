// src/models/location.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use crate::models::patch::Patch;

/// Campos editáveis de um ponto de entrega (tudo menos `route_id` e `images`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationFields {
    #[serde(rename = "location", default)]
    #[sqlx(rename = "location")]
    #[schema(example = "Main St. Depot")]
    pub name: String,

    #[schema(example = "104")]
    pub code: Option<String>,

    /// Número de sequência na rota.
    #[sqlx(rename = "seq_no")]
    pub no: Option<i32>,

    #[schema(example = "Daily")]
    pub delivery: Option<String>,

    /// `Daily`, `Weekday`, `Alt 1` ou `Alt 2`.
    #[schema(example = "Weekday")]
    pub power_mode: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub website_link: Option<String>,
    pub qr_code_image: Option<String>,
    pub qr_code_destination_url: Option<String>,

    #[schema(example = "#e53935")]
    pub marker_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i32,
    pub route_id: i32,

    #[serde(flatten)]
    #[sqlx(flatten)]
    pub fields: LocationFields,

    #[serde(default)]
    pub images: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Id de rota vindo do cliente: número ou texto numérico.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(i64),
    Text(String),
}

impl LooseId {
    /// Só inteiros não negativos que cabem numa coluna SERIAL.
    pub fn parse(&self) -> Option<i32> {
        let value = match self {
            LooseId::Number(n) => i32::try_from(*n).ok(),
            LooseId::Text(s) => s.trim().parse::<i32>().ok(),
        };
        value.filter(|n| *n >= 0)
    }
}

impl From<i32> for LooseId {
    fn from(id: i32) -> Self {
        LooseId::Number(i64::from(id))
    }
}

// ---
// Payload: CreateLocation
// ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationPayload {
    #[schema(value_type = Option<i64>, example = 12)]
    pub route_id: Option<LooseId>,

    #[serde(flatten)]
    pub fields: LocationFields,

    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateLocationPayload {
    /// Valida os campos obrigatórios e devolve o `route_id` já convertido.
    pub fn validate_required(&self) -> Result<i32, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let route_id = match &self.route_id {
            None => {
                errors.add("routeId", required("The 'routeId' field is required."));
                None
            }
            Some(raw) => {
                let parsed = raw.parse();
                if parsed.is_none() {
                    errors.add("routeId", invalid("The 'routeId' must be a non-negative integer."));
                }
                parsed
            }
        };

        if self.fields.name.trim().is_empty() {
            errors.add("location", required("The 'location' field is required."));
        }

        match route_id {
            Some(id) if errors.is_empty() => Ok(id),
            _ => Err(errors),
        }
    }
}

fn required(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("required");
    err.message = Some(message.into());
    err
}

fn invalid(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("invalid");
    err.message = Some(message.into());
    err
}

/// Atualização parcial de ponto. A lista de imagens fica de fora:
/// ela só muda por `add_image` / `remove_image`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationPatch {
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<i32>)]
    pub route_id: Patch<i32>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub location: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub code: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<i32>)]
    pub no: Patch<i32>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub delivery: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub power_mode: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<f64>)]
    pub latitude: Patch<f64>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<f64>)]
    pub longitude: Patch<f64>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub website_link: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub qr_code_image: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub qr_code_destination_url: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    #[schema(value_type = Option<String>)]
    pub marker_color: Patch<String>,
}

impl LocationPatch {
    pub fn is_empty(&self) -> bool {
        *self == LocationPatch::default()
    }

    /// Aplica os campos editáveis; `route_id` é tratado por quem chama.
    pub fn apply_to(&self, fields: &mut LocationFields) {
        self.location.apply_required(&mut fields.name);
        self.code.apply_to(&mut fields.code);
        self.no.apply_to(&mut fields.no);
        self.delivery.apply_to(&mut fields.delivery);
        self.power_mode.apply_to(&mut fields.power_mode);
        self.latitude.apply_to(&mut fields.latitude);
        self.longitude.apply_to(&mut fields.longitude);
        self.description.apply_to(&mut fields.description);
        self.address.apply_to(&mut fields.address);
        self.website_link.apply_to(&mut fields.website_link);
        self.qr_code_image.apply_to(&mut fields.qr_code_image);
        self.qr_code_destination_url.apply_to(&mut fields.qr_code_destination_url);
        self.marker_color.apply_to(&mut fields.marker_color);
    }

    pub fn between(old: &LocationFields, new: &LocationFields) -> Self {
        Self {
            route_id: Patch::Absent,
            location: Patch::changed(&old.name, &new.name),
            code: Patch::between(&old.code, &new.code),
            no: Patch::between(&old.no, &new.no),
            delivery: Patch::between(&old.delivery, &new.delivery),
            power_mode: Patch::between(&old.power_mode, &new.power_mode),
            latitude: Patch::between(&old.latitude, &new.latitude),
            longitude: Patch::between(&old.longitude, &new.longitude),
            description: Patch::between(&old.description, &new.description),
            address: Patch::between(&old.address, &new.address),
            website_link: Patch::between(&old.website_link, &new.website_link),
            qr_code_image: Patch::between(&old.qr_code_image, &new.qr_code_image),
            qr_code_destination_url: Patch::between(
                &old.qr_code_destination_url,
                &new.qr_code_destination_url,
            ),
            marker_color: Patch::between(&old.marker_color, &new.marker_color),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationBatchEntry {
    pub id: Option<i32>,

    #[serde(flatten)]
    pub patch: LocationPatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    #[serde(default)]
    pub image_url: String,
}

/// Acrescenta a URL ao fim da lista.
pub fn append_image(images: &mut Vec<String>, url: &str) {
    images.push(url.to_string());
}

/// Remove só a primeira ocorrência exata. Devolve `false` se não achou.
pub fn remove_first_image(images: &mut Vec<String>, url: &str) -> bool {
    match images.iter().position(|img| img == url) {
        Some(index) => {
            images.remove(index);
            true
        }
        None => false,
    }
}
