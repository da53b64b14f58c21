//! 服务层模块

pub mod export;
pub mod patch_service;
pub mod prompt_service;

pub use export::ProjectExporter;
pub use patch_service::PatchService;
pub use prompt_service::PromptService;
