pub mod grocery;
pub mod meal;
pub mod user;
