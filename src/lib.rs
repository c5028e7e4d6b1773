// #![warn(missing_docs)]

//! # planarize
//!
//! A Rust library for planarity testing, planar embedding and
//! crossing-minimizing edge insertion.
//!
//! Based on [`petgraph`](https://docs.rs/petgraph) for graph interchange;
//! the core works on an arena graph with an explicit rotation system.
//!
//! The pipeline: [`planar_subgraph`] picks edges to delete, [`planarity`]
//! embeds the planar rest, [`triconnected`]/[`spqr_tree`] decompose each
//! block, and [`edge_insertion`] threads the deleted edges back through the
//! decomposition, one degree-4 dummy node per crossing. [`planarize::planarize`]
//! runs the whole chain in one call.

pub mod block_cut;
pub mod edge_insertion;
pub mod edge_insertion_blocks;
pub mod embedding;
pub mod graph;
pub mod graph_blocks;
pub mod lec;
pub mod plan_rep;
pub mod planar_subgraph;
pub mod planarity;
pub mod planarity_blocks;
pub mod planarize;
pub mod pq_blocks;
pub mod pq_tree;
pub mod spqr_blocks;
pub mod spqr_tree;
pub mod st_numbering;
pub mod testing;
pub mod triconnected;
pub mod triconnected_blocks;
pub mod types;

pub use graph::Graph;
pub use planarity::is_planar;
pub use planarity::planar_embed;
pub use types::DiGraph;
pub use types::EdgeLabel;
pub use types::ReturnType;
pub use types::UnGraph;
