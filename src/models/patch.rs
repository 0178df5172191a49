// src/models/patch.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Um campo de atualização parcial com três estados.
///
/// - `Absent`: o campo não veio no JSON, o valor guardado é mantido.
/// - `Null`: o campo veio como `null`, o valor guardado é apagado.
/// - `Set(v)`: o campo veio com um valor, que substitui o guardado.
///
/// Use com `#[serde(default, skip_serializing_if = "Patch::is_absent")]`
/// para que a ausência sobreviva à ida e volta pelo JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// `None` quando não há nada a escrever; `Some(None)` para apagar.
    pub fn as_write(&self) -> Option<Option<&T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Set(v) => Some(Some(v)),
        }
    }
}

impl<T: Clone + PartialEq> Patch<T> {
    /// Aplica o patch a uma coluna anulável.
    pub fn apply_to(&self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Set(v) => *target = Some(v.clone()),
        }
    }

    /// Aplica o patch a uma coluna obrigatória. `Null` é ignorado aqui:
    /// quem chama já deve ter rejeitado esse caso.
    pub fn apply_required(&self, target: &mut T) {
        if let Patch::Set(v) = self {
            *target = v.clone();
        }
    }

    /// Diferença entre dois valores anuláveis, pronta para ser enviada.
    pub fn between(old: &Option<T>, new: &Option<T>) -> Self {
        if old == new {
            return Patch::Absent;
        }
        match new {
            Some(v) => Patch::Set(v.clone()),
            None => Patch::Null,
        }
    }

    pub fn changed(old: &T, new: &T) -> Self {
        if old == new {
            Patch::Absent
        } else {
            Patch::Set(new.clone())
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Só é chamado quando a chave existe; a ausência vem do `#[serde(default)]`.
        Option::<T>::deserialize(deserializer).map(|v| v.map_or(Patch::Null, Patch::Set))
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(v) => serializer.serialize_some(v),
            _ => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, Serialize)]
    struct Probe {
        #[serde(default, skip_serializing_if = "Patch::is_absent")]
        description: Patch<String>,
    }

    #[test]
    fn missing_null_and_value_are_distinct() {
        let missing: Probe = serde_json::from_value(json!({})).unwrap();
        let null: Probe = serde_json::from_value(json!({ "description": null })).unwrap();
        let set: Probe = serde_json::from_value(json!({ "description": "x" })).unwrap();

        assert_eq!(missing.description, Patch::Absent);
        assert_eq!(null.description, Patch::Null);
        assert_eq!(set.description, Patch::Set("x".to_string()));
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let body = serde_json::to_value(Probe::default()).unwrap();
        assert_eq!(body, json!({}));

        let body = serde_json::to_value(Probe { description: Patch::Null }).unwrap();
        assert_eq!(body, json!({ "description": null }));
    }

    #[test]
    fn apply_and_between_agree() {
        let old = Some("a".to_string());
        let new = None;
        let patch = Patch::between(&old, &new);
        assert_eq!(patch, Patch::Null);

        let mut target = old.clone();
        patch.apply_to(&mut target);
        assert_eq!(target, new);

        assert_eq!(Patch::between(&old, &old), Patch::Absent);
        assert_eq!(Patch::changed(&1, &2), Patch::Set(2));
    }
}
