pub mod diagnostics;
pub mod literature_search;
pub mod synthesis;
pub mod term_expander;

pub use diagnostics::ModelDiagnostics;
pub use literature_search::LiteratureSearch;
pub use synthesis::SynthesisComposer;
pub use term_expander::TermExpander;
