pub mod gateway;
pub mod manager;
pub mod params;
pub mod routine;
pub mod row;

pub use gateway::Gateway;
pub use manager::{DatabaseError, DatabaseManager};
pub use params::SqlParam;
pub use routine::{Function, Procedure};
pub use row::JsonRow;
