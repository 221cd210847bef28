//! Core library for the curso-seeder command line application.
//!
//! The library exposes the pieces the binary wires together and the test
//! suite exercises directly: credential loading in [`curso::seeder::config`],
//! the course data model and JSON shape validation in
//! [`curso::seeder::model`], the table-store abstraction with its hosted and
//! in-memory implementations in [`curso::seeder::store`], and the seeding
//! operations plus the file-by-file driver in [`curso::seeder::seed`].

pub mod curso;

pub use curso::seeder::{Result, SeedError, config, error, model, seed, store};
