pub mod fetch_stage;
pub mod format_stage;
pub mod generate_stage;
pub mod render_stage;

pub use fetch_stage::FetchStage;
pub use format_stage::FormatStage;
pub use generate_stage::GenerateStage;
pub use render_stage::RenderStage;
