pub mod batch;
pub mod location;
pub mod patch;
pub mod power;
pub mod route;

pub use batch::{BatchFailure, BatchOutcome};
pub use location::{CreateLocationPayload, Location, LocationBatchEntry, LocationFields, LocationPatch};
pub use patch::Patch;
pub use route::{CreateRoutePayload, Route, RouteBatchEntry, RouteFields, RoutePatch, RouteWithLocations};

use validator::ValidationError;

// ---
// Validação Customizada
// ---
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required.".into());
        return Err(err);
    }
    Ok(())
}
