//! Document model consumed by the lens renderer.
//!
//! A [`Container`] exposes its on-screen bounds, its current layout transform and
//! the image entries it holds. [`Document`] is the concrete scrollable/zoomable
//! column of images used by the studio; tests use their own containers.

mod container;
mod element;
mod layout;

pub use container::{Container, DocumentSnapshot, ImageEntry};
pub use element::{ElementId, ImageElement, LoadStatus};
pub use layout::{Document, DocumentConfig};
