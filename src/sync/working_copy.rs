// src/sync/working_copy.rs

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    models::{Location, LocationFields, Route, RouteFields, power},
    sync::ids::RowId,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RouteDraft {
    pub id: RowId,
    pub fields: RouteFields,
}

impl From<&Route> for RouteDraft {
    fn from(route: &Route) -> Self {
        Self {
            id: RowId::Persisted(route.id),
            fields: route.fields.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationDraft {
    pub id: RowId,
    pub route_id: RowId,
    pub fields: LocationFields,
    pub images: Vec<String>,
}

impl From<&Location> for LocationDraft {
    fn from(location: &Location) -> Self {
        Self {
            id: RowId::Persisted(location.id),
            route_id: RowId::Persisted(location.route_id),
            fields: location.fields.clone(),
            images: location.images.clone(),
        }
    }
}

/// Store normalizado: rotas e pontos por id, índice de pontos por rota e a
/// ordem de exibição de cada coleção (mais recente primeiro).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingCopy {
    routes: HashMap<RowId, RouteDraft>,
    route_order: Vec<RowId>,
    locations: HashMap<RowId, LocationDraft>,
    by_route: HashMap<RowId, Vec<RowId>>,
}

impl WorkingCopy {
    /// Monta a cópia a partir das listas do servidor (já em `created_at DESC`).
    pub fn from_server(routes: &[Route], locations: &[Location]) -> Self {
        let mut copy = Self::default();
        for route in routes {
            copy.put_route(RouteDraft::from(route));
        }
        for location in locations {
            copy.put_location(LocationDraft::from(location));
        }
        copy
    }

    // ---
    // Leitura
    // ---

    pub fn route(&self, id: RowId) -> Option<&RouteDraft> {
        self.routes.get(&id)
    }

    pub fn routes(&self) -> impl Iterator<Item = &RouteDraft> {
        self.route_order.iter().filter_map(|id| self.routes.get(id))
    }

    pub fn route_count(&self) -> usize {
        self.route_order.len()
    }

    pub fn location(&self, id: RowId) -> Option<&LocationDraft> {
        self.locations.get(&id)
    }

    /// Todos os pontos, agrupados na ordem das rotas. Órfãos (rota fora da cópia) no fim.
    pub fn locations(&self) -> impl Iterator<Item = &LocationDraft> {
        let orphans = self
            .by_route
            .iter()
            .filter(|(route, _)| !self.routes.contains_key(route))
            .flat_map(|(_, ids)| ids.iter());

        self.route_order
            .iter()
            .filter_map(|route| self.by_route.get(route))
            .flat_map(|ids| ids.iter())
            .chain(orphans)
            .filter_map(|id| self.locations.get(id))
    }

    pub fn locations_of(&self, route: RowId) -> impl Iterator<Item = &LocationDraft> {
        self.by_route
            .get(&route)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.locations.get(id))
    }

    pub fn location_count(&self, route: RowId) -> usize {
        self.by_route.get(&route).map_or(0, Vec::len)
    }

    pub fn location_counts(&self) -> HashMap<RowId, usize> {
        self.route_order
            .iter()
            .map(|id| (*id, self.location_count(*id)))
            .collect()
    }

    /// Códigos que aparecem mais de uma vez na rota (só aviso, o servidor aceita).
    pub fn duplicate_codes(&self, route: RowId) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for location in self.locations_of(route) {
            let Some(code) = location.fields.code.as_deref().map(str::trim) else {
                continue;
            };
            if code.is_empty() {
                continue;
            }
            let count = seen.entry(code).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(code.to_string());
            }
        }
        order
    }

    /// Pontos da rota na ordem de exibição do dia: ligados primeiro, depois por código.
    pub fn display_order(&self, route: RowId, date: NaiveDate) -> Vec<&LocationDraft> {
        let mut list: Vec<&LocationDraft> = self.locations_of(route).collect();
        list.sort_by(|a, b| {
            power::display_order(
                a.fields.power_mode.as_deref(),
                a.fields.code.as_deref(),
                b.fields.power_mode.as_deref(),
                b.fields.code.as_deref(),
                date,
            )
        });
        list
    }

    // ---
    // Escrita (só pelo redutor da sessão)
    // ---

    /// Insere ou substitui. Linha nova entra no fim da ordem.
    pub(crate) fn put_route(&mut self, draft: RouteDraft) {
        if !self.routes.contains_key(&draft.id) {
            self.route_order.push(draft.id);
        }
        self.routes.insert(draft.id, draft);
    }

    pub(crate) fn insert_route_front(&mut self, draft: RouteDraft) {
        self.route_order.retain(|id| *id != draft.id);
        self.route_order.insert(0, draft.id);
        self.routes.insert(draft.id, draft);
    }

    pub(crate) fn route_mut(&mut self, id: RowId) -> Option<&mut RouteDraft> {
        self.routes.get_mut(&id)
    }

    /// Remove a rota e os pontos dela (mesma cascata do servidor).
    pub(crate) fn remove_route(&mut self, id: RowId) -> Option<(RouteDraft, Vec<LocationDraft>)> {
        let draft = self.routes.remove(&id)?;
        self.route_order.retain(|r| *r != id);
        let children = self
            .by_route
            .remove(&id)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|loc| self.locations.remove(&loc))
            .collect();
        Some((draft, children))
    }

    pub(crate) fn put_location(&mut self, draft: LocationDraft) {
        if let Some(previous) = self.locations.get(&draft.id).map(|l| l.route_id) {
            if previous == draft.route_id {
                self.locations.insert(draft.id, draft);
                return;
            }
            self.unlink_location(previous, draft.id);
        }
        self.by_route.entry(draft.route_id).or_default().push(draft.id);
        self.locations.insert(draft.id, draft);
    }

    pub(crate) fn insert_location_front(&mut self, draft: LocationDraft) {
        if let Some(previous) = self.locations.get(&draft.id).map(|l| l.route_id) {
            self.unlink_location(previous, draft.id);
        }
        self.by_route.entry(draft.route_id).or_default().insert(0, draft.id);
        self.locations.insert(draft.id, draft);
    }

    pub(crate) fn location_mut(&mut self, id: RowId) -> Option<&mut LocationDraft> {
        self.locations.get_mut(&id)
    }

    pub(crate) fn remove_location(&mut self, id: RowId) -> Option<LocationDraft> {
        let draft = self.locations.remove(&id)?;
        self.unlink_location(draft.route_id, id);
        Some(draft)
    }

    /// Move o ponto para outra rota, no topo da lista dela.
    pub(crate) fn move_location(&mut self, id: RowId, route: RowId) -> Option<RowId> {
        let mut draft = self.locations.get(&id)?.clone();
        let previous = draft.route_id;
        draft.route_id = route;
        self.insert_location_front(draft);
        Some(previous)
    }

    /// Troca o id pendente pelo id do banco, mantendo a posição e o índice.
    pub(crate) fn promote_route(&mut self, pending: RowId, persisted: RowId) {
        let Some(mut draft) = self.routes.remove(&pending) else {
            return;
        };
        draft.id = persisted;
        self.routes.insert(persisted, draft);
        for id in self.route_order.iter_mut().filter(|id| **id == pending) {
            *id = persisted;
        }
        if let Some(children) = self.by_route.remove(&pending) {
            for child in &children {
                if let Some(location) = self.locations.get_mut(child) {
                    location.route_id = persisted;
                }
            }
            self.by_route.entry(persisted).or_default().extend(children);
        }
    }

    pub(crate) fn promote_location(&mut self, pending: RowId, persisted: RowId) {
        let Some(mut draft) = self.locations.remove(&pending) else {
            return;
        };
        draft.id = persisted;
        if let Some(ids) = self.by_route.get_mut(&draft.route_id) {
            for id in ids.iter_mut().filter(|id| **id == pending) {
                *id = persisted;
            }
        }
        self.locations.insert(persisted, draft);
    }

    fn unlink_location(&mut self, route: RowId, id: RowId) {
        if let Some(ids) = self.by_route.get_mut(&route) {
            ids.retain(|l| *l != id);
            if ids.is_empty() {
                self.by_route.remove(&route);
            }
        }
    }
}
