//! Request and response bodies

pub mod segments;
