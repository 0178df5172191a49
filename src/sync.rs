//! Cópia de trabalho do cliente e o protocolo de salvamento em lote.
//!
//! O cliente edita rotas e pontos localmente (otimista), marca cada rota
//! alterada como suja, guarda as exclusões sem enviá-las e, no `save`,
//! faz exclusões -> upserts -> releitura completa contra o [`Gateway`].

pub mod gateway;
pub mod http_gateway;
pub mod ids;
pub mod session;
pub mod working_copy;

#[cfg(test)]
mod memory;

pub use gateway::{Gateway, GatewayError};
pub use http_gateway::HttpGateway;
pub use ids::RowId;
pub use session::{Action, SaveReport, SyncError, SyncSession, SyncState};
pub use working_copy::{LocationDraft, RouteDraft, WorkingCopy};
