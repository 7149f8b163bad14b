pub mod formatter;
pub mod serialization;
