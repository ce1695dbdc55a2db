//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module   | Command handled                                  |
//! |----------|--------------------------------------------------|
//! | `serve`  | `Serve`: run the HTTP intake server              |
//! | `init`   | `Init`: scaffold the workspace layout            |
//! | `export` | `Export`: print a submission store to stdout     |

pub mod export;
pub mod init;
pub mod serve;

pub use export::cmd_export;
pub use init::cmd_init;
pub use serve::cmd_serve;
