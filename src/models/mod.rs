pub mod food;
pub mod meal;
