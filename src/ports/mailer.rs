//! Mailer port: Trait for sending an estimate by e-mail.

/// A plaintext message carrying one estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Outbound mail transport.
pub trait EstimateMailer: Send + Sync {
    /// Error type for transport failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send one message.
    ///
    /// # Errors
    /// Returns error if the address is invalid or delivery fails.
    fn send(&self, message: &EstimateEmail) -> Result<(), Self::Error>;
}
