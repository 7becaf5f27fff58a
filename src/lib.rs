//! pagestash: a small blog server that renders each page once, stores the HTML
//! in an S3-compatible bucket and serves later requests from the bucket.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
