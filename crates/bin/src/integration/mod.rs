//! Integration of the EDINET client, the extraction engine and report output.
//!
//! This module provides the batch pipeline and the on-disk cache it reads
//! archives from and writes reports to.

pub(crate) mod cache_manager;
pub(crate) mod pipeline;
