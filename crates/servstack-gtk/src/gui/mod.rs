pub mod app;
pub mod form;
pub mod stack;
pub mod theme;
