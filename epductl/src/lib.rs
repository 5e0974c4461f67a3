//! # epductl
//!
//! Async control library for Eaton ePDU power distribution units over SSH.
//!
//! The PDU's management CLI is an interactive shell that answers `get` and
//! `set` requests on a tree of named objects. This crate logs into that shell,
//! frames each request/reply exchange on the device prompt, validates the
//! identity of the unit, and switches outlets on and off.
//!
//! ## Features
//!
//! - Async SSH connections via russh, with known_hosts checking
//! - Prompt-framed replies that survive fragmentation and long output
//! - Identity validation against a registry of supported models
//! - Range-checked outlet batches
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use epductl::{OutletAction, PduBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), epductl::Error> {
//!     let mut pdu = PduBuilder::new("192.168.1.10")
//!         .username("admin")
//!         .password("admin")
//!         .connect()
//!         .await?;
//!
//!     println!("{}", pdu.identity());
//!
//!     for outcome in pdu.apply(OutletAction::Off, &[1, 2]).await? {
//!         println!("{}", outcome);
//!     }
//!
//!     pdu.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod device;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use channel::ShellChannel;
pub use device::{DeviceIdentity, ModelRegistry, OutletAction, OutletOutcome, Pdu, PduBuilder};
pub use error::{Error, Result};
pub use protocol::{ObjectPath, ObjectStore};
pub use session::{Response, SessionConfig, ShellSession, SshSession};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
