pub mod data;
pub mod errors;
pub mod query;
pub mod response;
