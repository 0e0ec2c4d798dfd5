use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Classifier API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response carried no text content")]
    NoTextContent,
}
