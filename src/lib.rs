//! Two-party line-oriented chat over TCP.
//!
//! One process hosts (accepts a connection), the other connects; immediately
//! after connect each side sends its display name as one line and reads the
//! peer's, then both exchange `sender,content` chat lines until either side
//! disconnects. Each module covers one responsibility:
//!
//! - [`cli`] parses the command-line surface for the host and connect roles.
//! - [`config`] validates the session configuration once, up front.
//! - [`message`] is the wire codec: one [`message::Message`] per line.
//! - [`connection`] wraps one live socket with line framing in both
//!   directions and an idempotent close.
//! - [`session`] runs the name handshake and the two concurrent chat loops
//!   until both finish.
//! - [`connect`] and [`host`] drive whole sessions per role, including the
//!   reconnect prompt between them.
//! - [`interrupt`] turns Ctrl-C into a watch signal the loops and prompts
//!   can select on.
//! - [`screen`] renders text and messages to the terminal.
//!
//! Unit and integration tests use this crate directly to exercise the codec,
//! the connection lifecycle, and full sessions over real sockets.

pub mod cli;
pub mod config;
pub mod connect;
pub mod connection;
pub mod host;
pub mod interrupt;
pub mod message;
pub mod screen;
pub mod session;
