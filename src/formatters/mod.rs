pub mod statement;

pub use statement::{quote, quote_bytes, shorten, statement_color, RenderConfig, RenderedLine, Renderer};
