// Adapters layer: concrete implementations of the domain ports.

pub mod hh;
pub mod postgres;

pub use hh::HhClient;
pub use postgres::PgStore;
