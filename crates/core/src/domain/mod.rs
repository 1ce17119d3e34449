pub mod neo;
pub mod summary;
