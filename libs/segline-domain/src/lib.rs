//! # Segline Domain Layer
//!
//! This crate contains the pure business logic and domain models for Segline,
//! a service that assigns users to named segments and answers membership queries.
//! It follows hexagonal architecture principles:
//!
//! - **Entities**: Core domain models (Segment, Membership ids)
//! - **Ports**: Trait definitions for external dependencies (SegmentRepository)
//! - **Services**: Business logic orchestration (SegmentService)
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (SQL, HTTP, etc.).
//! All external dependencies are expressed as traits (ports) that are implemented
//! by adapter layers.
//!
//! ## Example
//!
//! ```rust
//! use segline_domain::segment::SegmentService;
//! use segline_domain::storage::SegmentRepository;
//!
//! // The service is generic over any SegmentRepository implementation
//! async fn example<R: SegmentRepository>(service: SegmentService<R>) {
//!     let segment = service.create_segment("avito discount 30").await.unwrap();
//!     println!("Created segment: {}", segment.slug());
//! }
//! ```

pub mod segment;
pub mod storage;

// Re-export commonly used types
pub use segment::{MembershipUpdate, Segment, SegmentError, SegmentId, SegmentService, UserId};
pub use storage::SegmentRepository;
