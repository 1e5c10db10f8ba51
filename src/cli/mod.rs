//! # CLI
//!
//! ```bash
//! # Serve GET /api/pets/{id} from a SQLite database
//! pet-lookup serve --database pets.db --addr 127.0.0.1:8080
//!
//! # Print the routing table
//! pet-lookup routes
//! ```
//!
//! `serve` reads `config/config.yaml` when present (or `--config`), then
//! applies `PET_LOOKUP_*` environment overrides, then the flags.

mod commands;


pub use commands::{run, run_cli, Cli, Commands};
