//! Error handling and display for the CLI.

use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("API error: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API URL '{0}'")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an API error from response details.
    pub fn api(
        status: u16,
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
            request_id,
        }
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let Some(cli_err) = err.downcast_ref::<CliError>() else {
        return;
    };

    match cli_err {
        CliError::Api { code, .. } if code == "invalid_id" => {
            eprintln!(
                "\n{}",
                "Hint: Parcel ids look like `oJZWV`. Run `parcelctl list` to see them.".yellow()
            );
        }
        CliError::Api { status: 404, .. } => {
            eprintln!(
                "\n{}",
                "Hint: The parcel may have been removed. Run `parcelctl list`.".yellow()
            );
        }
        CliError::Network(_) | CliError::InvalidUrl(_) => {
            eprintln!(
                "\n{}",
                "Hint: Check PARCEL_API_URL or pass --api-url.".yellow()
            );
        }
        _ => {}
    }

    if let CliError::Api {
        request_id: Some(request_id),
        ..
    } = cli_err
    {
        eprintln!("\nRequest ID: {}", request_id);
    }
}
