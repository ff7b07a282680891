// Library root for the huddle application: configuration, lookup sources,
// calculator assembly and report rendering. The binary is a thin shell over
// these modules so integration tests can drive them directly.

pub mod cache;
pub mod config;
pub mod desk;
pub mod report;
pub mod roster;
