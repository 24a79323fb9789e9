pub mod action;
pub mod paper;

pub use action::{
    Action, ActionRequest, AnalysisResponse, AnalyzePayload, MeshTermsResponse, SearchPayload,
};
pub use paper::{
    AnalysisReport, ControlledTerm, PaperSummary, RecencyWindow, YearRange, NO_AUTHORS, NO_TITLE,
};
