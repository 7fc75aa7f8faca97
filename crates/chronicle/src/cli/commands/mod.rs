//! CLI commands

mod amend;
mod completions;
mod init;
mod new;
mod release;
mod render;
mod status;

pub use amend::AmendCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use new::NewCommand;
pub use release::ReleaseCommand;
pub use render::RenderCommand;
pub use status::StatusCommand;
