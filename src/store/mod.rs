//! Persistence layer: the document store collaborator and its backends.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod query;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use memory::MemoryStore;
pub use traits::{
    Direction, Document, DocumentStore, Fields, OrderBy, Query, SortKind, WriteOp,
};

/// Collection names shared with the web client.
pub mod collections {
    /// One profile document per user, keyed by user id.
    pub const USERS: &str = "users";
    /// Goal documents, each carrying a `userId` field.
    pub const GOALS: &str = "goals";
    /// Workout plan documents, each carrying a `userId` field.
    pub const WORKOUT_PLANS: &str = "workoutPlans";
}
