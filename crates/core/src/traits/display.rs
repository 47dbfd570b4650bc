//! Display surface for the voice button

use crate::ButtonView;

pub trait DisplaySurface: Send + Sync {
    fn render(&self, view: &ButtonView);
}
