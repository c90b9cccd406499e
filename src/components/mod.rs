pub mod demo;
pub mod dump_panel;
pub mod params_panel;
pub mod play_controls;
pub mod region_panel;
pub mod viewer;
