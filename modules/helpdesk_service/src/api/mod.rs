//! API layer: in-process client and REST surface

pub mod native;
pub mod rest;
