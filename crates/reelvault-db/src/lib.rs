//! Reelvault-DB: database schema, migrations, and query operations.
//!
//! SQLite with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use reelvault_db::pool::{init_pool, get_conn};
//! use reelvault_db::queries::videos;
//!
//! let pool = init_pool("/var/lib/reelvault/reelvault.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let ready = videos::list_ready(&conn).unwrap();
//! println!("{} videos ready", ready.len());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
