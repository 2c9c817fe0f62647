pub mod base;
pub mod box_zoom;
pub mod zoom_slider;

pub use base::PluginTrait;
pub use box_zoom::{
    AspectRatioPolicy, BoxBoundsPolicy, BoxZoomControl, BoxZoomGesture, BoxZoomOptions,
    DragRectPolicy, GestureStep,
};
pub use zoom_slider::{Knob, ZoomSliderControl, ZoomSliderOptions};
