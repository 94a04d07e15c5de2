pub mod access;
pub mod company;
pub mod credential;
pub mod events;
pub mod merkle;
pub mod roles;
pub mod status;
