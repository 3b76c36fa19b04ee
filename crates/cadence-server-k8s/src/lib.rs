// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cluster job store abstraction for Cadence.
//!
//! This crate provides:
//! - The [`JobStore`] trait over live job records
//! - [`KubeJobStore`], backed by Kubernetes `CronJob` resources
//! - [`MemoryJobStore`], an in-memory store for tests and local runs

mod error;
mod kube_store;
mod memory;
mod store;

pub use error::{ClusterError, ClusterResult};
pub use kube_store::KubeJobStore;
pub use memory::{MemoryJobStore, StoreOperation};
pub use store::{ensure_namespace, ClusterJobRecord, JobStore};
