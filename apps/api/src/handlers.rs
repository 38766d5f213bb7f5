pub mod audit;
pub mod categories;
pub mod health;
pub mod privileges;
