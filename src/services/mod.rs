pub mod api_client;
pub mod capture_service;
pub mod controller;
pub mod preview_service;
pub mod session;
pub mod thumbnail_chain;
pub mod video_id;
pub mod view_machine;
