pub mod location_service;
pub mod normalize;
pub mod route_service;

pub use location_service::LocationService;
pub use route_service::RouteService;
