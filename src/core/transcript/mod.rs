pub mod transcript_html;
pub mod transcript_theme;

pub use transcript_html::*;
