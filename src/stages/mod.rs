//! Stream stages.
//!
//! A stage instance owns all of its mutable state (color registry,
//! combination accumulator) and handles one element at a time. Per-element
//! stages implement [`Processor`]; stages that accumulate a single output
//! over the whole stream implement [`Sink`].

pub mod combine_od;
pub mod overlay_ic;
pub mod overlay_is;
pub mod overlay_od;
pub mod overlay_sink;

pub use combine_od::{CombineOd, CombineOdOptions, STREAM_INDEX};
pub use overlay_ic::{OverlayIc, OverlayIcOptions};
pub use overlay_is::{OverlayIs, OverlayIsOptions};
pub use overlay_od::{OverlayOd, OverlayOdOptions};
pub use overlay_sink::{OverlaySink, OverlaySinkOptions};

use log::error;

use crate::error::ImgvisError;
use crate::font::{load_font, FontResolver, TextRasterizer};

/// A stage that turns each element into an output element.
pub trait Processor<E> {
    /// Processes one element.
    ///
    /// # Errors
    /// Returns an error for fatal conditions (bad configuration, undecodable
    /// images). Recoverable conditions are logged instead.
    fn process(&mut self, element: E) -> Result<E, ImgvisError>;
}

/// A stage that consumes elements and produces its output at stream end.
pub trait Sink<E> {
    /// Consumes one element.
    fn consume(&mut self, element: &E) -> Result<(), ImgvisError>;

    /// Writes the accumulated output.
    fn finish(&mut self) -> Result<(), ImgvisError>;
}

/// Loads the font for a stage, disabling text output if not even the
/// fallback family is available.
pub(crate) fn stage_font(
    resolver: &dyn FontResolver,
    family: &str,
    size: f32,
) -> Option<Box<dyn TextRasterizer>> {
    match load_font(resolver, family, size) {
        Ok(font) => Some(font),
        Err(err) => {
            error!("{}; text output disabled", err);
            None
        }
    }
}
