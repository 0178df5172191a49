pub mod location_repo;
pub mod route_repo;

pub use location_repo::LocationRepository;
pub use route_repo::RouteRepository;
