pub mod alerts;
pub mod chat;
pub mod facilities;
pub mod lots;
pub mod summary;
