pub mod health;
pub mod routes;
pub mod weekly_plans;

pub use routes::create_routes;
