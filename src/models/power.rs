// src/models/power.rs

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Modos de agenda de energia de um ponto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Daily,
    Weekday,
    Alt1,
    Alt2,
}

impl PowerMode {
    /// Aceita `Daily`, `Weekday`, `Alt 1`/`Alt-1`/`Alt1` e o mesmo para `Alt 2`,
    /// sem diferenciar maiúsculas.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "daily" => Some(PowerMode::Daily),
            "weekday" => Some(PowerMode::Weekday),
            "alt1" => Some(PowerMode::Alt1),
            "alt2" => Some(PowerMode::Alt2),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PowerMode::Daily => "Daily",
            PowerMode::Weekday => "Weekday",
            PowerMode::Alt1 => "Alt 1",
            PowerMode::Alt2 => "Alt 2",
        }
    }

    pub fn status_on(self, date: NaiveDate) -> PowerStatus {
        let on = match self {
            PowerMode::Daily => true,
            PowerMode::Weekday => !matches!(date.weekday(), Weekday::Fri | Weekday::Sat),
            PowerMode::Alt1 => date.day() % 2 == 1,
            PowerMode::Alt2 => date.day() % 2 == 0,
        };
        if on { PowerStatus::On } else { PowerStatus::Off }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum PowerStatus {
    // A ordem das variantes é a ordem de exibição: ligados primeiro.
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerStatus::On => f.write_str("ON"),
            PowerStatus::Off => f.write_str("OFF"),
        }
    }
}

/// Status de energia de um modo (texto livre) numa data. Modo desconhecido => OFF.
pub fn power_status(mode: &str, date: NaiveDate) -> PowerStatus {
    PowerMode::parse(mode)
        .map(|m| m.status_on(date))
        .unwrap_or(PowerStatus::Off)
}

/// Ordem de exibição: ON antes de OFF; dentro do grupo, código numérico crescente.
/// Códigos não numéricos vêm depois dos numéricos (ordem léxica), e sem código por último.
pub fn display_order(
    a_mode: Option<&str>,
    a_code: Option<&str>,
    b_mode: Option<&str>,
    b_code: Option<&str>,
    date: NaiveDate,
) -> Ordering {
    let status = |mode: Option<&str>| power_status(mode.unwrap_or_default(), date);

    status(a_mode)
        .cmp(&status(b_mode))
        .then_with(|| compare_codes(a_code, b_code))
}

fn compare_codes(a: Option<&str>, b: Option<&str>) -> Ordering {
    // (grupo, número, texto): 0 = numérico, 1 = texto, 2 = vazio
    fn key(code: Option<&str>) -> (u8, f64, String) {
        match code.map(str::trim).filter(|c| !c.is_empty()) {
            None => (2, 0.0, String::new()),
            Some(c) => match c.parse::<f64>() {
                Ok(n) if n.is_finite() => (0, n, String::new()),
                _ => (1, 0.0, c.to_string()),
            },
        }
    }

    let (ga, na, ta) = key(a);
    let (gb, nb, tb) = key(b);
    ga.cmp(&gb)
        .then_with(|| na.total_cmp(&nb))
        .then_with(|| ta.cmp(&tb))
}
