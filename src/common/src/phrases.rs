//! User facing phrases shared by the template tooling.

pub const LOAD_TEMPLATE_ERROR: &str = "failed to load template";
pub const SAVE_TEMPLATE_ERROR: &str = "failed to save template";
