use eframe::egui::{self, Color32};

// Color Palette
pub const PRIMARY_BUTTON_BG: Color32 = Color32::from_rgb(76, 154, 255); // Start download
pub const DANGER_BUTTON_BG: Color32 = Color32::from_rgb(214, 69, 65); // Cancel

// Text Colors
pub const BUTTON_MAIN_TEXT: Color32 = Color32::from_rgb(255, 255, 255);
pub const SECONDARY_TEXT: Color32 = Color32::from_rgb(110, 110, 118);
pub const TEXT_ERROR: Color32 = Color32::from_rgb(200, 30, 30);
pub const TEXT_SUCCESS: Color32 = Color32::from_rgb(20, 140, 60);
pub const TEXT_WARNING: Color32 = Color32::from_rgb(200, 120, 0);

// Surfaces
pub const PANEL_BG: Color32 = Color32::from_rgb(248, 248, 248);
pub const LOG_BG: Color32 = Color32::from_rgb(248, 249, 250);
pub const LOG_TEXT: Color32 = Color32::from_rgb(73, 80, 87);
pub const BORDER_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 60, 67, 15);

// Sizing & Spacing
pub const ROUNDING_FRAME: f32 = 4.0;
pub const ROUNDING_BUTTON: f32 = 6.0;
pub const MIN_SIZE_BUTTON: egui::Vec2 = egui::Vec2::new(120.0, 36.0);
pub const BUTTON_FONT_SIZE: f32 = 15.0;
pub const LOG_FONT_SIZE: f32 = 11.0;
