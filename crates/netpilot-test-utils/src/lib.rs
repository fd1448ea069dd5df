//! Shared test utilities for the NetPilot workspace.
//!
//! This crate provides scripted collaborators and fixtures so crate test
//! suites never touch the real system. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`fakes`]: [`FakeLoader`], [`FakeInstaller`] and [`FakeDiscovery`]
//! - [`devices`]: descriptors and interface records for known hardware
//! - [`fixtures`]: [`ConfigFixture`], a scratch directory laid out like a
//!   system with `loader.conf`, `rc.conf` and a backup directory

pub mod devices;
pub mod fakes;
pub mod fixtures;

pub use fakes::{FakeDiscovery, FakeInstaller, FakeLoader};
pub use fixtures::ConfigFixture;
