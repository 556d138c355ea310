pub mod dialogs;
pub mod panels;
pub mod plot;
