//! Municipal civil eviction case scraper.
//!
//! Searches the court portal for eviction filings in bounded date windows,
//! extracts each case's summary and parties, and maintains a CSV dataset
//! whose pending cases are re-checked for dispositions on later runs.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scrapers;

pub use dataset::{Dataset, IssuesTable};
pub use error::{Result, ScrapeError};
pub use pipeline::{Job, JobReport, RunPlan, RunSettings};
