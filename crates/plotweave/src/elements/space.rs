use plotweave_core::geometry::{Point, Size};

use crate::{
    element::{BuildContext, Element, Justification},
    error::Result,
    surface::Surface,
};

/// Empty element reserving a fixed area.
#[derive(Debug, Clone, Default)]
pub struct Space {
    size: Size,
    justification: Justification,
}

impl Space {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size::new(width, height),
            justification: Justification::default(),
        }
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }
}

impl Element for Space {
    fn build(&mut self, _ctx: &BuildContext<'_>) -> Result<()> {
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn draw(&self, _surface: &mut Surface, _center: Point) -> Result<()> {
        Ok(())
    }

    fn justification(&self) -> Justification {
        self.justification
    }
}
