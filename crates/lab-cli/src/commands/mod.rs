pub mod audit;
pub mod component;
pub mod dispatch;
pub mod result;
pub mod shared;
pub mod study;
pub mod user;
pub mod worker;
