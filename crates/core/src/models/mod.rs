pub mod account;
pub mod chart;
pub mod selection;
pub mod settings;
pub mod value;
pub mod view;
