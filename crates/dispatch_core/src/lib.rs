//! # Dispatch Engine Core
//!
//! A batch-oriented optimiser for prepared-food delivery dispatch.
//!
//! ## Overview
//!
//! This crate provides the six-stage dispatch pipeline plus its two external
//! collaborators:
//!
//! - **Intake**: fetch pending orders, filter by time window and geographic radius
//! - **Time Bucketing**: group orders by quantised desired delivery time
//! - **Geo Clustering**: partition each bucket by travel proximity under a capacity cap
//! - **Route Planning**: build an optimised round-trip route per cluster
//! - **Readiness Modelling**: estimate when a cluster's last pizza is ready
//! - **Assignment**: Hungarian-style driver/cluster assignment with relaxation
//!
//! ## Example
//!
//! ```rust,no_run
//! use dispatch_core::{config::DispatchConfig, dispatcher::run_dispatch};
//! use dispatch_core::persistence::in_memory::InMemoryStore;
//! use dispatch_core::route_provider::InMemoryRouteProvider;
//! use std::sync::Arc;
//!
//! # async fn go() -> dispatch_core::error::Result<()> {
//! let config = DispatchConfig::default();
//! let store = Arc::new(InMemoryStore::new());
//! let provider = Arc::new(InMemoryRouteProvider::default());
//! let outcome = run_dispatch(&config, store.as_ref(), provider.as_ref(), None).await?;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod config;
pub mod geo;
pub mod models;
pub mod intake;
pub mod time_bucket;
pub mod geo_cluster;
pub mod route_provider;
pub mod route_planner;
pub mod readiness;
pub mod matching;
pub mod persistence;
pub mod dispatcher;

#[cfg(test)]
pub mod test_support;
