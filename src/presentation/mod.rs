//! HTML presentation: askama templates and the page renderer.

pub mod views;
