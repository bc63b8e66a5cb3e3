//! # domscout-core
//!
//! Continuous discovery of visible, interactable elements in a rendered
//! document, including nested frames.
//!
//! ## Pipeline
//!
//! ```text
//! ObservationLoop ──pulse──► Traversal ──per candidate──► VisibilityEvaluator
//!                                │                         LocatorGenerator
//!                                │                         NameExtractor
//!                                ▼
//!                            Inventory (locator → descriptor)
//! ```
//!
//! Each candidate is gated on visibility and size, given a locator and a
//! name, validated against the live document and committed. When both a
//! parent and its child qualify, the child wins and the parent entry is
//! dropped. Frames are walked with an explicit worklist.
//!
//! The rendering engine sits behind the traits in [`driver`]; the
//! `domscout-cdp` crate implements them over the Chrome DevTools Protocol.

pub mod config;
pub mod css;
pub mod driver;
pub mod error;
pub mod facts;
pub mod inventory;
pub mod locator;
pub mod name;
pub mod observer;
pub mod scripts;
pub mod traversal;
pub mod visibility;

pub use config::ExtractionConfig;
pub use driver::{BoundingBox, ElementHandle, FrameContext, RootSource};
pub use error::{DriverError, ScoutError};
pub use facts::ElementFacts;
pub use inventory::{ElementDescriptor, Inventory};
pub use locator::LocatorGenerator;
pub use name::NameExtractor;
pub use observer::{LoopState, Observation, ObservationLoop};
pub use traversal::{PassReport, Traversal};
pub use visibility::{BoundingInfo, VisibilityEvaluator};
