pub mod builder;
pub mod controls;
pub mod link;
pub mod widget;

pub use builder::{BuilderConfig, BuilderPanel, PanelLinks, SliderConfig, Surface};
pub use controls::{Choice, Control, Row, Slider};
pub use link::{FieldRef, FieldStore, LinkHandle, Links};
pub use widget::Widget;
