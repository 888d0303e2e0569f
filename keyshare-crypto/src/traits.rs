pub mod scheme;
pub mod vss;
