// src/sync/ids.rs

use std::fmt;

use uuid::Uuid;

/// Identificador de uma linha na cópia de trabalho.
///
/// `Persisted` carrega o id do banco; `Pending` marca uma linha criada no
/// cliente que ainda não foi salva.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowId {
    Persisted(i32),
    Pending(Uuid),
}

impl RowId {
    pub fn new_pending() -> Self {
        RowId::Pending(Uuid::new_v4())
    }

    pub fn persisted(self) -> Option<i32> {
        match self {
            RowId::Persisted(id) => Some(id),
            RowId::Pending(_) => None,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, RowId::Pending(_))
    }
}

impl From<i32> for RowId {
    fn from(id: i32) -> Self {
        RowId::Persisted(id)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Persisted(id) => write!(f, "{}", id),
            RowId::Pending(token) => write!(f, "new:{}", token),
        }
    }
}
