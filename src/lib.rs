pub mod care;
pub mod dates;
pub mod db;
pub mod error;
pub mod models;
pub mod storage;

pub use db::PlantStore;
pub use error::{Result, StoreError};
