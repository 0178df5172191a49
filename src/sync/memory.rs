// src/sync/memory.rs
// Gateway em memória para os testes da sessão. Aplica as mesmas regras do
// servidor (normalização, cascata, lote com falhas parciais) e grava as chamadas.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use crate::{
    models::{
        BatchOutcome, CreateLocationPayload, CreateRoutePayload, Location, LocationBatchEntry,
        LocationFields, Route, RouteBatchEntry, RouteFields,
        location::{append_image, remove_first_image},
    },
    services::normalize,
    sync::gateway::{Gateway, GatewayError},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListRoutes,
    ListLocations,
    CreateRoute(String),
    UpdateRoutes(Vec<RouteBatchEntry>),
    DeleteRoute(i32),
    CreateLocation(String),
    UpdateLocations(Vec<LocationBatchEntry>),
    DeleteLocation(i32),
    AddImage(i32, String),
    RemoveImage(i32, String),
}

#[derive(Default)]
struct Store {
    routes: Vec<Route>,
    locations: Vec<Location>,
    next_id: i32,
    calls: Vec<Call>,
}

impl Store {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn route_mut(&mut self, id: i32) -> Result<&mut Route, GatewayError> {
        self.routes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| GatewayError::NotFound("Route not found".into()))
    }

    fn location_mut(&mut self, id: i32) -> Result<&mut Location, GatewayError> {
        self.locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| GatewayError::NotFound("Location not found".into()))
    }

    fn update_route(&mut self, entry: &RouteBatchEntry) -> Result<Route, GatewayError> {
        let id = entry
            .id
            .ok_or_else(|| GatewayError::Validation("Missing id".into()))?;
        let patch = normalize::route_patch(&entry.patch)
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        let route = self.route_mut(id)?;
        patch.apply_to(&mut route.fields);
        route.updated_at = Utc::now();
        Ok(route.clone())
    }

    fn update_location(&mut self, entry: &LocationBatchEntry) -> Result<Location, GatewayError> {
        let id = entry
            .id
            .ok_or_else(|| GatewayError::Validation("Missing id".into()))?;
        let patch = normalize::location_patch(&entry.patch)
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        if let Some(Some(route_id)) = patch.route_id.as_write() {
            self.route_mut(*route_id)?;
        }
        let location = self.location_mut(id)?;
        patch.apply_to(&mut location.fields);
        patch.route_id.apply_required(&mut location.route_id);
        location.updated_at = Utc::now();
        Ok(location.clone())
    }
}

#[derive(Default)]
pub struct MemoryGateway {
    store: Mutex<Store>,
}

impl MemoryGateway {
    pub fn seed_route(&self, name: &str) -> i32 {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        store.routes.insert(
            0,
            Route {
                id,
                fields: RouteFields {
                    name: name.into(),
                    shift: "AM".into(),
                    warehouse: "North".into(),
                    description: None,
                },
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        );
        id
    }

    pub fn seed_location(&self, route_id: i32, name: &str) -> i32 {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        store.locations.insert(
            0,
            Location {
                id,
                route_id,
                fields: LocationFields {
                    name: name.into(),
                    ..Default::default()
                },
                images: Vec::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        );
        id
    }

    /// Simula outro cliente apagando a rota.
    pub fn drop_route(&self, id: i32) {
        let mut store = self.store.lock().unwrap();
        store.routes.retain(|r| r.id != id);
        store.locations.retain(|l| l.route_id != id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.store.lock().unwrap().calls.clear();
    }

    pub fn routes(&self) -> Vec<Route> {
        self.store.lock().unwrap().routes.clone()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.store.lock().unwrap().locations.clone()
    }

    pub fn location(&self, id: i32) -> Option<Location> {
        self.locations().into_iter().find(|l| l.id == id)
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list_routes(&self) -> Result<Vec<Route>, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::ListRoutes);
        Ok(store.routes.clone())
    }

    async fn list_locations(&self) -> Result<Vec<Location>, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::ListLocations);
        Ok(store.locations.clone())
    }

    async fn create_route(&self, payload: &CreateRoutePayload) -> Result<Route, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::CreateRoute(payload.route.clone()));
        payload
            .validate()
            .map_err(|e| GatewayError::Validation(e.to_string()))?;

        let fields = normalize::route_fields(&RouteFields {
            name: payload.route.clone(),
            shift: payload.shift.clone(),
            warehouse: payload.warehouse.clone(),
            description: payload.description.clone(),
        });
        let route = Route {
            id: store.next_id(),
            fields,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.routes.insert(0, route.clone());
        Ok(route)
    }

    async fn update_routes(
        &self,
        entries: &[RouteBatchEntry],
    ) -> Result<BatchOutcome<Route>, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::UpdateRoutes(entries.to_vec()));
        let mut outcome = BatchOutcome::default();
        for entry in entries {
            let result = store.update_route(entry);
            outcome.record(entry.id, result);
        }
        Ok(outcome)
    }

    async fn delete_route(&self, id: i32) -> Result<(), GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::DeleteRoute(id));
        store.route_mut(id)?;
        store.locations.retain(|l| l.route_id != id);
        store.routes.retain(|r| r.id != id);
        Ok(())
    }

    async fn create_location(
        &self,
        payload: &CreateLocationPayload,
    ) -> Result<Location, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::CreateLocation(payload.fields.name.clone()));
        let route_id = payload
            .validate_required()
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        store.route_mut(route_id)?;

        let location = Location {
            id: store.next_id(),
            route_id,
            fields: normalize::location_fields(&payload.fields),
            images: payload.images.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        store.locations.insert(0, location.clone());
        Ok(location)
    }

    async fn update_locations(
        &self,
        entries: &[LocationBatchEntry],
    ) -> Result<BatchOutcome<Location>, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::UpdateLocations(entries.to_vec()));
        let mut outcome = BatchOutcome::default();
        for entry in entries {
            let result = store.update_location(entry);
            outcome.record(entry.id, result);
        }
        Ok(outcome)
    }

    async fn delete_location(&self, id: i32) -> Result<(), GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::DeleteLocation(id));
        store.location_mut(id)?;
        store.locations.retain(|l| l.id != id);
        Ok(())
    }

    async fn add_image(&self, id: i32, url: &str) -> Result<Location, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::AddImage(id, url.to_string()));
        if url.trim().is_empty() {
            return Err(GatewayError::Validation("The 'imageUrl' field is required.".into()));
        }
        let location = store.location_mut(id)?;
        append_image(&mut location.images, url);
        Ok(location.clone())
    }

    async fn remove_image(&self, id: i32, url: &str) -> Result<Location, GatewayError> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(Call::RemoveImage(id, url.to_string()));
        let location = store.location_mut(id)?;
        remove_first_image(&mut location.images, url);
        Ok(location.clone())
    }
}
