pub mod popup;
pub mod scalar;
