//! Storage port module

pub mod ports;

pub use ports::SegmentRepository;
