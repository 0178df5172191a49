// src/sync/session.rs

use std::collections::HashMap;

use futures::future::join_all;
use thiserror::Error;

use crate::{
    models::{
        BatchFailure, CreateLocationPayload, CreateRoutePayload, LocationBatchEntry,
        LocationFields, LocationPatch, Patch, RouteBatchEntry, RouteFields, RoutePatch,
        location::{LooseId, append_image, remove_first_image},
        power::PowerMode,
    },
    sync::{
        gateway::{Gateway, GatewayError},
        ids::RowId,
        working_copy::{LocationDraft, RouteDraft, WorkingCopy},
    },
};

/// Toda mutação da cópia de trabalho passa por aqui.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddRoute(RouteFields),
    EditRoute { id: RowId, patch: RoutePatch },
    /// Rota salva vai para a fila de exclusão; rota nova é só descartada.
    DeleteRoute(RowId),
    AddLocation { route_id: RowId, fields: LocationFields },
    /// `patch.route_id` é ignorado; para trocar de rota use `MoveLocation`.
    EditLocation { id: RowId, patch: LocationPatch },
    MoveLocation { id: RowId, route_id: RowId },
    DeleteLocation(RowId),
    SetPowerMode { id: RowId, mode: PowerMode },
    SetMarkerColor { id: RowId, color: Option<String> },
    AddImage { id: RowId, url: String },
    RemoveImage { id: RowId, url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Clean,
    Dirty,
    Saving,
    SaveFailed(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("route {0} is not in the working copy")]
    UnknownRoute(RowId),

    #[error("location {0} is not in the working copy")]
    UnknownLocation(RowId),

    #[error("route {id} is missing required fields: {}", .missing.join(", "))]
    IncompleteRoute {
        id: RowId,
        missing: Vec<&'static str>,
    },

    #[error("location {0} needs a name")]
    IncompleteLocation(RowId),

    #[error("location {location} belongs to route {route}, which has not been saved yet")]
    UnsavedRoute { location: RowId, route: RowId },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{} change(s) could not be saved", .failures.len())]
    Rejected { failures: Vec<BatchFailure> },
}

/// Contagens de um `save` concluído.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveReport {
    pub deleted_routes: usize,
    pub deleted_locations: usize,
    pub created_routes: usize,
    pub updated_routes: usize,
    pub created_locations: usize,
    pub updated_locations: usize,
    pub image_changes: usize,
    /// Rotas novas totalmente em branco, que não foram enviadas.
    pub skipped_routes: usize,
    /// Exclusões que falharam (toleradas, não são repetidas).
    pub delete_failures: Vec<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq)]
enum ImageOp {
    Add { location: i32, url: String },
    Remove { location: i32, url: String },
}

impl ImageOp {
    fn location(&self) -> i32 {
        match self {
            ImageOp::Add { location, .. } | ImageOp::Remove { location, .. } => *location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Saving,
    Failed(String),
}

#[derive(Default)]
struct SavePlan {
    route_creates: Vec<(RowId, CreateRoutePayload)>,
    route_updates: Vec<RouteBatchEntry>,
    location_creates: Vec<(RowId, CreateLocationPayload)>,
    location_updates: Vec<LocationBatchEntry>,
    /// Pontos que saem de uma rota marcada para exclusão.
    rescues: Vec<LocationBatchEntry>,
    skipped_routes: usize,
}

/// Sessão de edição: cópia de trabalho, última versão salva (base dos diffs),
/// snapshot para o cancelar, filas de exclusão e flags de sujeira por rota.
pub struct SyncSession<G: Gateway> {
    gateway: G,
    working: WorkingCopy,
    baseline: WorkingCopy,
    snapshot: WorkingCopy,
    deleted_routes: Vec<i32>,
    deleted_locations: Vec<i32>,
    image_ops: Vec<ImageOp>,
    dirty: HashMap<RowId, bool>,
    phase: Phase,
}

impl<G: Gateway> SyncSession<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            working: WorkingCopy::default(),
            baseline: WorkingCopy::default(),
            snapshot: WorkingCopy::default(),
            deleted_routes: Vec::new(),
            deleted_locations: Vec::new(),
            image_ops: Vec::new(),
            dirty: HashMap::new(),
            phase: Phase::Idle,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn working(&self) -> &WorkingCopy {
        &self.working
    }

    pub fn state(&self) -> SyncState {
        match &self.phase {
            Phase::Saving => SyncState::Saving,
            Phase::Failed(message) => SyncState::SaveFailed(message.clone()),
            Phase::Idle if self.has_unsaved_changes() => SyncState::Dirty,
            Phase::Idle => SyncState::Clean,
        }
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty.values().any(|dirty| *dirty)
    }

    pub fn is_route_dirty(&self, id: RowId) -> bool {
        self.dirty.get(&id).copied().unwrap_or(false)
    }

    pub fn staged_route_deletions(&self) -> &[i32] {
        &self.deleted_routes
    }

    pub fn staged_location_deletions(&self) -> &[i32] {
        &self.deleted_locations
    }

    /// Substitui tudo pela versão do servidor.
    pub async fn load(&mut self) -> Result<(), SyncError> {
        self.refresh().await?;
        Ok(())
    }

    /// Marca o ponto de retorno do `cancel`.
    pub fn begin_edit(&mut self) {
        self.snapshot = self.working.clone();
    }

    /// Volta ao snapshot. `confirm` só é consultado se houver alterações.
    pub fn cancel(&mut self, confirm: impl FnOnce() -> bool) -> bool {
        if self.has_unsaved_changes() && !confirm() {
            return false;
        }
        self.working = self.snapshot.clone();
        self.clear_staging();
        self.phase = Phase::Idle;
        true
    }

    // ---
    // Redutor
    // ---

    /// Aplica a ação e devolve o id da linha afetada (o novo id, em `Add*`).
    pub fn dispatch(&mut self, action: Action) -> Result<RowId, SyncError> {
        match action {
            Action::AddRoute(fields) => {
                let id = RowId::new_pending();
                self.working.insert_route_front(RouteDraft { id, fields });
                self.mark_dirty(id);
                Ok(id)
            }
            Action::EditRoute { id, patch } => {
                let draft = self.working.route_mut(id).ok_or(SyncError::UnknownRoute(id))?;
                patch.apply_to(&mut draft.fields);
                self.mark_dirty(id);
                Ok(id)
            }
            Action::DeleteRoute(id) => {
                let (_, children) = self
                    .working
                    .remove_route(id)
                    .ok_or(SyncError::UnknownRoute(id))?;

                // o servidor apaga os pontos junto com a rota
                let child_ids: Vec<i32> = children.iter().filter_map(|c| c.id.persisted()).collect();
                self.image_ops.retain(|op| !child_ids.contains(&op.location()));
                self.deleted_locations.retain(|l| !child_ids.contains(l));

                // pontos que acabaram de ser movidos para cá ainda pertencem a outra
                // rota no servidor; o cascade não os alcança
                for child in &children {
                    let Some(child_id) = child.id.persisted() else { continue };
                    let saved_route = self.baseline.location(child.id).map(|b| b.route_id);
                    if saved_route != Some(id) && !self.deleted_locations.contains(&child_id) {
                        self.deleted_locations.push(child_id);
                    }
                }

                match id.persisted() {
                    Some(route_id) => {
                        if !self.deleted_routes.contains(&route_id) {
                            self.deleted_routes.push(route_id);
                        }
                        self.mark_dirty(id);
                    }
                    None => {
                        self.dirty.remove(&id);
                    }
                }
                Ok(id)
            }
            Action::AddLocation { route_id, fields } => {
                if self.working.route(route_id).is_none() {
                    return Err(SyncError::UnknownRoute(route_id));
                }
                let id = RowId::new_pending();
                self.working.insert_location_front(LocationDraft {
                    id,
                    route_id,
                    fields,
                    images: Vec::new(),
                });
                self.mark_dirty(route_id);
                Ok(id)
            }
            Action::EditLocation { id, patch } => {
                self.edit_location(id, |draft| patch.apply_to(&mut draft.fields))
            }
            Action::MoveLocation { id, route_id } => {
                if self.working.route(route_id).is_none() {
                    return Err(SyncError::UnknownRoute(route_id));
                }
                let previous = self
                    .working
                    .move_location(id, route_id)
                    .ok_or(SyncError::UnknownLocation(id))?;
                self.mark_dirty(previous);
                self.mark_dirty(route_id);
                Ok(id)
            }
            Action::DeleteLocation(id) => {
                let draft = self
                    .working
                    .remove_location(id)
                    .ok_or(SyncError::UnknownLocation(id))?;
                if let Some(location_id) = id.persisted() {
                    self.image_ops.retain(|op| op.location() != location_id);
                    if !self.deleted_locations.contains(&location_id) {
                        self.deleted_locations.push(location_id);
                    }
                }
                self.mark_dirty(draft.route_id);
                Ok(id)
            }
            Action::SetPowerMode { id, mode } => self.edit_location(id, |draft| {
                draft.fields.power_mode = Some(mode.label().to_string());
            }),
            Action::SetMarkerColor { id, color } => {
                self.edit_location(id, |draft| draft.fields.marker_color = color)
            }
            Action::AddImage { id, url } => {
                if url.trim().is_empty() {
                    return Ok(id);
                }
                self.edit_location(id, |draft| append_image(&mut draft.images, &url))?;
                if let Some(location) = id.persisted() {
                    self.image_ops.push(ImageOp::Add { location, url });
                }
                Ok(id)
            }
            Action::RemoveImage { id, url } => {
                let draft = self
                    .working
                    .location_mut(id)
                    .ok_or(SyncError::UnknownLocation(id))?;
                if !remove_first_image(&mut draft.images, &url) {
                    return Ok(id);
                }
                let route_id = draft.route_id;
                self.mark_dirty(route_id);
                if let Some(location) = id.persisted() {
                    self.image_ops.push(ImageOp::Remove { location, url });
                }
                Ok(id)
            }
        }
    }

    fn edit_location(
        &mut self,
        id: RowId,
        edit: impl FnOnce(&mut LocationDraft),
    ) -> Result<RowId, SyncError> {
        let draft = self
            .working
            .location_mut(id)
            .ok_or(SyncError::UnknownLocation(id))?;
        edit(draft);
        let route_id = draft.route_id;
        self.mark_dirty(route_id);
        Ok(id)
    }

    fn mark_dirty(&mut self, route: RowId) {
        self.dirty.insert(route, true);
    }

    // ---
    // Save
    // ---

    /// Pontos resgatados -> exclusões -> upserts -> imagens -> releitura.
    ///
    /// Nada é enviado se a validação local falhar. Se algum upsert falhar a
    /// cópia de trabalho fica como está (e suja); linhas que chegaram a ser
    /// criadas já recebem o id do banco, então repetir o `save` não duplica.
    pub async fn save(&mut self) -> Result<SaveReport, SyncError> {
        let plan = self.plan_save()?;

        self.phase = Phase::Saving;
        tracing::info!(
            route_deletes = self.deleted_routes.len(),
            location_deletes = self.deleted_locations.len(),
            route_creates = plan.route_creates.len(),
            route_updates = plan.route_updates.len(),
            location_creates = plan.location_creates.len(),
            location_updates = plan.location_updates.len(),
            rescues = plan.rescues.len(),
            image_ops = self.image_ops.len(),
            "Salvando alterações"
        );

        let mut report = SaveReport {
            skipped_routes: plan.skipped_routes,
            ..SaveReport::default()
        };
        let mut failures = Vec::new();

        // sem o resgate, a exclusão da rota antiga levaria o ponto junto
        if let Err(rejected) = self.run_rescues(&plan.rescues, &mut report).await {
            return Err(self.fail(SyncError::Rejected { failures: rejected }));
        }

        self.run_deletes(&mut report).await;
        self.run_upserts(plan, &mut report, &mut failures).await;
        self.run_image_ops(&mut report, &mut failures).await;

        if !failures.is_empty() {
            return Err(self.fail(SyncError::Rejected { failures }));
        }

        if let Err(e) = self.refresh().await {
            return Err(self.fail(e.into()));
        }

        tracing::info!(?report, "Alterações salvas");
        Ok(report)
    }

    fn plan_save(&self) -> Result<SavePlan, SyncError> {
        let mut plan = SavePlan::default();

        for draft in self.working.routes() {
            match draft.id {
                RowId::Pending(_) => {
                    if !draft.fields.is_populated() {
                        plan.skipped_routes += 1;
                        continue;
                    }
                    check_route(draft)?;
                    plan.route_creates
                        .push((draft.id, CreateRoutePayload::from(&draft.fields)));
                }
                RowId::Persisted(id) => {
                    check_route(draft)?;
                    let patch = match self.baseline.route(draft.id) {
                        Some(base) => RoutePatch::between(&base.fields, &draft.fields),
                        None => RoutePatch::between(&RouteFields::default(), &draft.fields),
                    };
                    if !patch.is_empty() {
                        plan.route_updates.push(RouteBatchEntry { id: Some(id), patch });
                    }
                }
            }
        }

        for draft in self.working.locations() {
            let Some(route_id) = draft.route_id.persisted() else {
                return Err(SyncError::UnsavedRoute {
                    location: draft.id,
                    route: draft.route_id,
                });
            };
            if draft.fields.name.trim().is_empty() {
                return Err(SyncError::IncompleteLocation(draft.id));
            }

            match draft.id {
                RowId::Pending(_) => plan.location_creates.push((
                    draft.id,
                    CreateLocationPayload {
                        route_id: Some(LooseId::from(route_id)),
                        fields: draft.fields.clone(),
                        images: draft.images.clone(),
                    },
                )),
                RowId::Persisted(id) => {
                    let base = self.baseline.location(draft.id);
                    let mut patch = match base {
                        Some(base) => LocationPatch::between(&base.fields, &draft.fields),
                        None => LocationPatch::between(&LocationFields::default(), &draft.fields),
                    };
                    if base.map(|b| b.route_id) != Some(draft.route_id) {
                        patch.route_id = Patch::Set(route_id);
                    }
                    if patch.is_empty() {
                        continue;
                    }
                    let entry = LocationBatchEntry { id: Some(id), patch };
                    let leaves_deleted_route = base
                        .and_then(|b| b.route_id.persisted())
                        .is_some_and(|old| self.deleted_routes.contains(&old));
                    if leaves_deleted_route {
                        plan.rescues.push(entry);
                    } else {
                        plan.location_updates.push(entry);
                    }
                }
            }
        }

        Ok(plan)
    }

    /// Move para a rota nova os pontos cuja rota antiga vai ser excluída.
    /// Se algum falhar, nada é excluído.
    async fn run_rescues(
        &mut self,
        rescues: &[LocationBatchEntry],
        report: &mut SaveReport,
    ) -> Result<(), Vec<BatchFailure>> {
        if rescues.is_empty() {
            return Ok(());
        }

        let outcome = self.gateway.update_locations(rescues).await.map_err(|e| {
            vec![BatchFailure {
                id: None,
                error: e.to_string(),
            }]
        })?;

        report.updated_locations += outcome.updated;
        for location in &outcome.results {
            self.baseline.put_location(LocationDraft::from(location));
        }

        if outcome.failures.is_empty() {
            Ok(())
        } else {
            Err(outcome.failures)
        }
    }

    /// Rotas e pontos em paralelo; falhas só entram no relatório.
    async fn run_deletes(&mut self, report: &mut SaveReport) {
        let gateway = &self.gateway;

        let routes = join_all(
            self.deleted_routes
                .iter()
                .map(|id| async move { (*id, gateway.delete_route(*id).await) }),
        )
        .await;
        let locations = join_all(
            self.deleted_locations
                .iter()
                .map(|id| async move { (*id, gateway.delete_location(*id).await) }),
        )
        .await;

        for (id, result) in routes {
            match result {
                Ok(()) => report.deleted_routes += 1,
                Err(e) if e.is_not_found() => tracing::warn!(id, "Rota já não existia no servidor"),
                Err(e) => {
                    tracing::warn!(id, error = %e, "Falha ao excluir rota");
                    report.delete_failures.push(BatchFailure {
                        id: Some(id),
                        error: e.to_string(),
                    });
                }
            }
        }
        for (id, result) in locations {
            match result {
                Ok(()) => report.deleted_locations += 1,
                Err(e) if e.is_not_found() => tracing::warn!(id, "Ponto já não existia no servidor"),
                Err(e) => {
                    tracing::warn!(id, error = %e, "Falha ao excluir ponto");
                    report.delete_failures.push(BatchFailure {
                        id: Some(id),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.deleted_routes.clear();
        self.deleted_locations.clear();
    }

    async fn run_upserts(
        &mut self,
        plan: SavePlan,
        report: &mut SaveReport,
        failures: &mut Vec<BatchFailure>,
    ) {
        let gateway = &self.gateway;

        let routes = async {
            let created = join_all(
                plan.route_creates
                    .iter()
                    .map(|(id, payload)| async move { (*id, gateway.create_route(payload).await) }),
            )
            .await;
            let updated = if plan.route_updates.is_empty() {
                None
            } else {
                Some(gateway.update_routes(&plan.route_updates).await)
            };
            (created, updated)
        };

        let locations = async {
            let created = join_all(plan.location_creates.iter().map(|(id, payload)| async move {
                (*id, gateway.create_location(payload).await)
            }))
            .await;
            let updated = if plan.location_updates.is_empty() {
                None
            } else {
                Some(gateway.update_locations(&plan.location_updates).await)
            };
            (created, updated)
        };

        let ((routes_created, routes_updated), (locations_created, locations_updated)) =
            futures::join!(routes, locations);

        for (pending, result) in routes_created {
            match result {
                Ok(route) => {
                    report.created_routes += 1;
                    let draft = RouteDraft::from(&route);
                    self.working.promote_route(pending, draft.id);
                    if let Some(flag) = self.dirty.remove(&pending) {
                        self.dirty.insert(draft.id, flag);
                    }
                    self.snapshot.put_route(draft.clone());
                    self.baseline.put_route(draft);
                }
                Err(e) => failures.push(BatchFailure {
                    id: None,
                    error: e.to_string(),
                }),
            }
        }

        match routes_updated {
            Some(Ok(outcome)) => {
                report.updated_routes += outcome.updated;
                for route in &outcome.results {
                    self.baseline.put_route(RouteDraft::from(route));
                }
                failures.extend(outcome.failures);
            }
            Some(Err(e)) => failures.push(BatchFailure {
                id: None,
                error: e.to_string(),
            }),
            None => {}
        }

        for (pending, result) in locations_created {
            match result {
                Ok(location) => {
                    report.created_locations += 1;
                    let draft = LocationDraft::from(&location);
                    self.working.promote_location(pending, draft.id);
                    self.snapshot.put_location(draft.clone());
                    self.baseline.put_location(draft);
                }
                Err(e) => failures.push(BatchFailure {
                    id: None,
                    error: e.to_string(),
                }),
            }
        }

        match locations_updated {
            Some(Ok(outcome)) => {
                report.updated_locations += outcome.updated;
                for location in &outcome.results {
                    self.baseline.put_location(LocationDraft::from(location));
                }
                failures.extend(outcome.failures);
            }
            Some(Err(e)) => failures.push(BatchFailure {
                id: None,
                error: e.to_string(),
            }),
            None => {}
        }
    }

    /// Na ordem em que foram feitas. As que falham ficam na fila.
    async fn run_image_ops(&mut self, report: &mut SaveReport, failures: &mut Vec<BatchFailure>) {
        let ops = std::mem::take(&mut self.image_ops);
        let mut remaining = Vec::new();

        for op in ops {
            let result = match &op {
                ImageOp::Add { location, url } => self.gateway.add_image(*location, url).await,
                ImageOp::Remove { location, url } => self.gateway.remove_image(*location, url).await,
            };
            match result {
                Ok(location) => {
                    report.image_changes += 1;
                    self.baseline.put_location(LocationDraft::from(&location));
                }
                Err(e) => {
                    failures.push(BatchFailure {
                        id: Some(op.location()),
                        error: e.to_string(),
                    });
                    remaining.push(op);
                }
            }
        }

        self.image_ops = remaining;
    }

    async fn refresh(&mut self) -> Result<(), GatewayError> {
        let (routes, locations) =
            futures::try_join!(self.gateway.list_routes(), self.gateway.list_locations())?;

        let fresh = WorkingCopy::from_server(&routes, &locations);
        self.working = fresh.clone();
        self.baseline = fresh.clone();
        self.snapshot = fresh;
        self.clear_staging();
        self.phase = Phase::Idle;
        Ok(())
    }

    fn clear_staging(&mut self) {
        self.deleted_routes.clear();
        self.deleted_locations.clear();
        self.image_ops.clear();
        self.dirty.clear();
    }

    fn fail(&mut self, error: SyncError) -> SyncError {
        tracing::error!(error = %error, "Falha ao salvar alterações");
        self.phase = Phase::Failed(error.to_string());
        error
    }
}

fn check_route(draft: &RouteDraft) -> Result<(), SyncError> {
    let missing = draft.fields.missing_required();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SyncError::IncompleteRoute {
            id: draft.id,
            missing,
        })
    }
}
