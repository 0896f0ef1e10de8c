//! Command handlers.
//!
//! | File          | Invocation                           | Description              |
//! |---------------|--------------------------------------|--------------------------|
//! | `transfer.rs` | `mongotransf <origin> <destination>` | Dump → restore pipeline  |

pub mod transfer;
