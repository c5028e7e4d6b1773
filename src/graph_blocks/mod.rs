pub mod adjacency_oracle;
pub mod arrays;
pub mod disjoint_sets;
