pub mod document;
pub mod manager;
pub mod memory;
pub mod object_id;
pub mod postgres;
pub mod repository;
pub mod seed;

pub use document::{next_updated_at, timestamp_now, Document};
pub use manager::{Database, DatabaseError};
pub use memory::MemoryRepository;
pub use object_id::{ObjectId, ObjectIdError};
pub use repository::{Repository, StoreError, UserRepository};
pub use seed::{SeedData, SeedError, SeedSummary};
