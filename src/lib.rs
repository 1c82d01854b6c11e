//! Student records and academic performance aggregation.
//!
//! Raw students, courses and grades go in; one [`models::AggregatedResult`]
//! per student comes out, carrying a credit-weighted GPA, a mean score and a
//! performance category. The engine in [`aggregate`] and [`grading`] is pure
//! and infallible. [`db`] and [`dataset`] supply the materialized records.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod db;
pub mod grading;
pub mod models;
pub mod report;
pub mod search;
pub mod stats;
pub mod validate;
