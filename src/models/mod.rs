pub mod prediction_types;
pub mod view_types;
