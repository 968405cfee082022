use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credentials rejected by quote provider")]
    Auth,

    #[error("quote board has no {0} row")]
    MissingTerm(&'static str),
}
