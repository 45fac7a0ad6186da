pub mod cover_service;

pub use cover_service::CoverService;
