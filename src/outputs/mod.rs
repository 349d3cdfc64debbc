//! Output generation modules for JSON artifacts and the HTML digest.
//!
//! This module contains submodules responsible for writing aggregated
//! records to their published forms:
//!
//! # Submodules
//!
//! - [`json`]: Writes per-entity records and the run index for the frontend
//! - [`html`]: Renders a single static digest page over the whole run
//!
//! # Output Structure
//!
//! ```text
//! data_dir/
//! ├── apple.json              # One record per entity, keyed by slug
//! ├── mahindra-and-mahindra.json
//! ├── ...
//! └── companies.json          # Run index, configuration order
//!
//! digest.html                  # Optional, anywhere --html-output points
//! ```

pub mod html;
pub mod json;
