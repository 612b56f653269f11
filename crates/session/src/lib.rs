//! Fitroom Session
//!
//! Owns everything a live preview needs between two ticks: the wardrobe of
//! preloaded garments, the current selection, and the open video source.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │               SessionController                │
//! │  ┌──────────┐  ┌───────────┐  ┌─────────────┐  │
//! │  │ Wardrobe │  │ Selection │  │ VideoSource │  │
//! │  └────┬─────┘  └─────┬─────┘  └──────┬──────┘  │
//! │       └───────┬──────┘   read        │         │
//! │               ▼  ◄───────────────────┘         │
//! │          composite ───► DisplaySink            │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! A controller can be ticked directly, or handed to a [`PreviewWorker`]
//! that ticks it on its own thread and publishes frames through a
//! latest-wins [`frame_slot`].

pub mod controller;
pub mod display;
pub mod selection;
pub mod wardrobe;
pub mod worker;

pub use controller::*;
pub use display::*;
pub use selection::*;
pub use wardrobe::*;
pub use worker::PreviewWorker;
