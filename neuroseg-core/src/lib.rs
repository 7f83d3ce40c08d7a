//! Neuroseg Core
//!
//! Core types and abstractions for the neuroseg segmentation client.
//!
//! This crate contains:
//! - Domain types: Core entities (TaskStatus, VolumetricResults, etc.)
//! - DTOs: Wire-format objects for talking to the segmentation backend
//! - Schedule: The adaptive polling interval policy

pub mod domain;
pub mod dto;
pub mod schedule;
