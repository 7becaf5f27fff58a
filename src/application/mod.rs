//! Application services: page assembly, article seeding and the seams the
//! infrastructure plugs into.

pub mod error;
pub mod pages;
pub mod render;
pub mod repos;
pub mod seed;
