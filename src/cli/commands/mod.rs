pub mod code_scanning;
pub mod freshness;
pub mod required_properties;
