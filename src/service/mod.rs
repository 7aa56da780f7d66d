pub mod audit_service;
pub mod booking_service;
pub mod error;
pub mod matching_service;
pub mod notification_service;
pub mod push_service;
pub mod transition;
