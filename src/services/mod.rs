pub mod pipeline_orchestrator_service;
pub mod pipeline_stages;
pub mod quiz_service;
pub mod stage;
