//! Server side of a single-property real-estate marketing site.
//!
//! The site's content lives in a generated JavaScript module edited through
//! the admin dashboard. This crate loads, merges, backs up and rewrites
//! that module, notifies an external webhook after each change, and serves
//! the RSVP and lead-capture endpoints used by the public pages.

pub mod leads;
pub mod logging;
pub mod notify;
pub mod rsvp;
pub mod server;
pub mod settings;
pub mod site;
pub mod update;
