pub mod export;
pub mod lifecycle;
pub mod notification;
