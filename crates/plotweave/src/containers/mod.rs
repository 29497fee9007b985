//! Elements that own and lay out other elements.

mod frame;
mod map;
mod popup;
mod sequence;
mod timeline;

pub use frame::Frame;
pub use map::Map;
pub use popup::Popup;
pub use sequence::{Separator, Sequence};
pub use timeline::{TimeLine, TimeLineEntry};
