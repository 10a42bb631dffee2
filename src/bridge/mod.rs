//! Bridge to the privileged client thread
//!
//! All reads of live game state from other threads go through [`ClientThread`].

mod client_thread;

pub use client_thread::ClientThread;
