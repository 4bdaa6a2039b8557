use std::path::PathBuf;

use billdiff_recon::ReconError;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("xlsx export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv export failed: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Recon(#[from] ReconError),
}
