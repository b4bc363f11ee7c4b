pub mod auth;
pub mod curriculum;
pub mod pages;
pub mod reference;
pub mod users;
