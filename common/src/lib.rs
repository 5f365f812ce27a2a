mod domain;
mod infrastructure;

// Persisted records field names

pub const ID_FIELD_NAME: &str = "id";

pub const CREATED_FIELD_NAME: &str = "created_at";
pub const UPDATED_FIELD_NAME: &str = "updated_at";
pub const DELETED_FIELD_NAME: &str = "deleted_at";

pub const CREATED_BY_FIELD_NAME: &str = "created_by";
pub const UPDATED_BY_FIELD_NAME: &str = "updated_by";

// expose domain module

pub use domain::*;

// expose database module

pub use infrastructure::database;
pub use infrastructure::database::connect as connect_to_database;
