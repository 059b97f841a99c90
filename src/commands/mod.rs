pub mod capture;
pub mod links;
pub mod view;
