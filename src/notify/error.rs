use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Evolution API credentials not configured")]
    NotConfigured,

    #[error("gateway returned status {status}: {message}")]
    Gateway { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_display() {
        let err = NotifyError::Gateway {
            status: 400,
            message: "bad number".into(),
        };
        assert_eq!(err.to_string(), "gateway returned status 400: bad number");
    }
}
