//! View structs and template rendering.

pub mod views;
