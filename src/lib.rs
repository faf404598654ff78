//! wxunlock - WeChat v4 artifact decryption.
//!
//! Turns WeChat's encrypted on-disk artifacts back into the bytes the
//! application itself works with:
//! - SQLCipher-style databases (AES-256-CBC pages authenticated with
//!   HMAC-SHA512, keys derived via PBKDF2-HMAC-SHA512)
//! - dat image containers (single-byte XOR, optionally mixed with an
//!   AES-128-ECB segment in the v4 container format)
//!
//! The `batch` module multiplexes independent database files across a
//! bounded worker pool while keeping every file's pages in order.

pub mod batch;
pub mod cli;
pub mod config;
pub mod dat;
pub mod db;
pub mod error;
pub mod key;
pub mod progress;
pub mod ui;

pub use error::{Error, Result};
