pub mod instances;
pub mod sessions;
