//! POV Core - Platform-agnostic Rendering Pipeline
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Rotations-Messung, Frame-Buffer, Renderer und Spalten-Pipeline
//! laufen hier als Pure Logic und sind auf dem Host testbar.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod frame;
pub mod payload;
pub mod pipeline;
pub mod region;
pub mod render;
pub mod rotation;
pub mod transfer;
pub mod wire;

// Re-exports für einfachen Zugriff
pub use frame::{FrameError, FrameReader, FrameStore, FrameView, FrameWriter};
pub use payload::{PayloadError, RegionFlags, parse_flags, parse_response};
pub use pipeline::{ColumnPipeline, PhaseOffset, PipelineState, PipelineStats};
pub use region::Region;
pub use render::{Renderer, render};
pub use rotation::{RotationSnapshot, RotationTracker};
pub use transfer::{ColumnBuffer, OutputTransfer, StripLane};
pub use wire::{encode, pack_rgb, unpack_rgb};
