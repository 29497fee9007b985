//! Leaf elements.

mod button;
mod image;
mod legend;
mod space;
mod text;

pub use button::Button;
pub use image::{Image, ImageSource};
pub use legend::{Legend, LegendPalette};
pub use space::Space;
pub use text::Text;
