//! # XCall Test Suite
//!
//! Unified test crate for flows that span dispatch, persistence and callback
//! resolution.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs        # Submit -> callback -> query round trips
//!     └── consistency.rs  # Ledger primitives, races, partial failures
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p xcall-tests
//! cargo test -p xcall-tests integration::consistency::
//! ```

#![allow(dead_code)]
