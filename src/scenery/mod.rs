//! Background and shoreline scenery
//!
//! Every element is generated once at startup. Per-frame work is limited
//! to small animations (twinkle, scroll, sway, tilt) and drawing.

pub mod clouds;
pub mod lotus;
pub mod moon;
pub mod mountains;
pub mod reeds;
pub mod stars;

pub use clouds::Clouds;
pub use lotus::{LotusFlowers, LotusPads};
pub use moon::Moon;
pub use mountains::Mountains;
pub use reeds::Reeds;
pub use stars::Stars;

use crate::display::PixelBuffer;
use crate::scene::FrameContext;

/// A piece of scenery drawn as one layer of the composition
pub trait Layer {
    /// Advance animation state (called once per frame, before rendering)
    fn update(&mut self, ctx: &FrameContext);

    /// Draw the layer
    fn render(&self, buffer: &mut PixelBuffer, ctx: &FrameContext);

    /// Layer name for logging
    fn name(&self) -> &str;
}
