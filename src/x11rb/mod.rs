//! An [XConn](crate::x::XConn) implementation using x11rb.
//!
//! The only error handling specific to this backend is the translation of
//! in-stream X errors into the benign / unexpected split described in the
//! crate error model: benign races are logged and dropped, everything
//! else is reported loudly but never takes the window manager down.
mod conn;

pub use conn::RustConn;
