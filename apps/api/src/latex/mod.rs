// LaTeX pipeline: sanitize model output → stage with template assets → compile to PDF.
// All compilation goes through the `LatexCompiler` trait; handlers never spawn processes.

pub mod compiler;
pub mod diagnostics;
pub mod sanitize;
pub mod templates;

pub use compiler::{CompileError, LatexCompiler, PdfLatexCompiler};
pub use sanitize::{sanitize, SanitizeOptions, SanitizedLatex};
pub use templates::{TemplateError, TemplateName, TemplateStore};
