pub mod core;
pub mod courses;
pub mod defaults;
pub mod format;
pub mod toggles;
