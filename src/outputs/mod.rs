//! Rendering and delivery of the finished digest.
//!
//! # Submodules
//!
//! - [`html`]: the HTML mail body
//! - [`text`]: plain-text renderings for the terminal and the mail's
//!   `text/plain` alternative
//! - [`mail`]: message assembly and SMTP dispatch
//!
//! Renderers are pure functions over `&[Article]`; only [`mail`] does I/O.

pub mod html;
pub mod mail;
pub mod text;
