//! Layer 3: Spatial
//!
//! # Purpose
//!
//! This layer provides the spatial acceleration structures used to select
//! neighborhoods:
//! - A k-d tree with k-nearest, range, and nearest queries
//! - A precomputed k-nearest-neighbor graph with breadth-style range
//!   expansion
//!
//! Both structures are immutable once built and safe to query from many
//! threads concurrently; all per-query state lives on the query itself.

/// K-d tree construction and storage.
pub mod kdtree;

/// Shared traversal machinery and query results.
pub mod query;

/// Precomputed k-nearest-neighbor graph.
pub mod knn_graph;
