use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("insufficient signal: {got} candidates after filtering, need {need}")]
    InsufficientSignal { got: usize, need: usize },

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("decode error: {0}")]
    Decode(String),
}
