//! Outbound email. Delivery failures never roll back stored codes; the
//! caller decides whether to surface them.

use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSendmailTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct Mailer {
    config: SmtpConfig,
}

impl Mailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Send an HTML email. When SMTP is disabled in config the message is
    /// logged instead so local development does not need a mail setup.
    pub async fn send(&self, to: &str, subject: &str, html_body: String) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("SMTP disabled, would have sent '{}' to {}", subject, to);
            return Ok(());
        }

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| AppError::Delivery(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Validation(format!("invalid email address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        if self.config.use_sendmail {
            let transport = AsyncSendmailTransport::<Tokio1Executor>::new();
            transport
                .send(message)
                .await
                .map_err(|e| AppError::Delivery(e.to_string()))?;
        } else {
            let creds = Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            );
            let transport: AsyncSmtpTransport<Tokio1Executor> =
                AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
                    .map_err(|e| AppError::Delivery(e.to_string()))?
                    .credentials(creds)
                    .port(self.config.port)
                    .build();
            transport
                .send(message)
                .await
                .map_err(|e| AppError::Delivery(e.to_string()))?;
        }

        tracing::info!("Sent '{}' to {}", subject, to);
        Ok(())
    }

    pub async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), AppError> {
        let body = format!(
            r#"<h2>Welcome to Hercules Pro!</h2>
<p>Your verification code is: <strong>{code}</strong></p>
<p>This code will expire in 10 minutes.</p>
<p>If you didn't request this code, please ignore this email.</p>"#
        );
        self.send(to, "Your Verification Code - Hercules Pro", body).await
    }

    pub async fn send_activation_code(
        &self,
        to: &str,
        first_name: &str,
        code: &str,
    ) -> Result<(), AppError> {
        let body = format!(
            r#"<h2>Welcome to Hercules Pro!</h2>
<p>Hi {first_name},</p>
<p>Your activation code is: <strong>{code}</strong></p>
<p>Please use this code to activate your account.</p>
<p>If you didn't create this account, please ignore this email.</p>"#
        );
        self.send(to, "Activate Your Hercules Pro Account", body).await
    }
}
