//! treeseek - timed tree-search experiments
//!
//! A participant is shown a hierarchical dataset as a tree and asked to find
//! one randomly chosen label; the time to find it is appended to a
//! line-delimited results log. The analysis side loads the log and computes
//! a histogram of times plus mean times per dataset and per participant.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod experiment;
pub mod nested;
pub mod report;
pub mod result_store;
pub mod session;
pub mod tree;
