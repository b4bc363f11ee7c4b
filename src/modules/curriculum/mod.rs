pub mod controller;
pub mod import;
pub mod router;
pub mod service;

pub use router::init_curriculum_router;
pub use service::CurriculumService;
