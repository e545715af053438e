// ABOUTME: Library root for imgdrop - the image registry and its collaborators.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod registry;
pub mod remote;
pub mod storage;
pub mod types;
pub mod upload;
pub mod view;

pub use registry::Registry;
