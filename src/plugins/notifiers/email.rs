use async_trait::async_trait;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailConfig;
use crate::plugins::traits::{MailTransport, NotificationEvent, NotificationResult, NotifierPlugin, OutgoingEmail};
use crate::utils::error::Result;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// STARTTLS SMTP delivery authenticated as the sender address.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let credentials = Credentials::new(config.from_email.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = Message::builder()
            .from(email.from.parse::<Mailbox>()?)
            .to(email.to.parse::<Mailbox>()?)
            .subject(email.subject.clone())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )?;

        let response = self.transport.send(message).await?;
        tracing::debug!("SMTP server accepted message: {:?}", response.code());
        Ok(())
    }
}

/// Renders notification events as HTML + plain-text email.
pub struct EmailNotifier {
    from_email: String,
    to_email: String,
    transport: Box<dyn MailTransport>,
}

impl EmailNotifier {
    pub fn new(from_email: impl Into<String>, to_email: impl Into<String>, transport: Box<dyn MailTransport>) -> Self {
        EmailNotifier {
            from_email: from_email.into(),
            to_email: to_email.into(),
            transport,
        }
    }

    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        let mailer = SmtpMailer::new(config)?;
        Ok(Self::new(config.from_email.clone(), config.to_email.clone(), Box::new(mailer)))
    }

    pub fn render(&self, event: &NotificationEvent) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from_email.clone(),
            to: self.to_email.clone(),
            subject: self.format_subject(event),
            html_body: self.format_html_body(event),
            text_body: self.format_text_body(event),
        }
    }

    fn format_subject(&self, event: &NotificationEvent) -> String {
        match event {
            NotificationEvent::PriceAlert { product_name, quote, .. } => {
                format!("Price Alert: {} - Now {}!", product_name, quote.formatted())
            }
            NotificationEvent::CheckFailed { product_name, .. } => format!("Price Check Failed - {}", product_name),
        }
    }

    fn format_html_body(&self, event: &NotificationEvent) -> String {
        match event {
            NotificationEvent::PriceAlert {
                product_name,
                product_url,
                quote,
                target,
                savings,
                checked_at,
            } => {
                let currency = quote.currency();
                format!(
                    r#"<html>
    <body>
        <h2 style="color: #28a745;">Price Drop Alert!</h2>
        <p><strong>{name}</strong> is now available at your target price!</p>
        <table style="border-collapse: collapse; margin: 20px 0;">
            <tr>
                <td style="padding: 8px; border: 1px solid #ddd;"><strong>Current Price:</strong></td>
                <td style="padding: 8px; border: 1px solid #ddd; color: #28a745; font-size: 18px;"><strong>{current}</strong></td>
            </tr>
            <tr>
                <td style="padding: 8px; border: 1px solid #ddd;"><strong>Target Price:</strong></td>
                <td style="padding: 8px; border: 1px solid #ddd;">{target}</td>
            </tr>
            <tr>
                <td style="padding: 8px; border: 1px solid #ddd;"><strong>Savings:</strong></td>
                <td style="padding: 8px; border: 1px solid #ddd;">{savings}</td>
            </tr>
        </table>
        <p><a href="{url}" style="background-color: #ff9900; color: white; padding: 10px 20px; text-decoration: none; border-radius: 3px; display: inline-block;">View Product</a></p>
        <p style="color: #666; font-size: 12px;">Checked at: {checked}</p>
    </body>
</html>
"#,
                    name = escape_html(product_name),
                    current = quote.formatted(),
                    target = currency.format(*target),
                    savings = currency.format(*savings),
                    url = escape_html(product_url),
                    checked = checked_at.format(TIMESTAMP_FORMAT),
                )
            }
            NotificationEvent::CheckFailed {
                product_name,
                product_url,
                reason,
                checked_at,
            } => format!(
                "<p>Failed to check price for <strong>{}</strong></p>\
                 <p>URL: {}</p>\
                 <p>Reason: {}</p>\
                 <p>Time: {}</p>",
                escape_html(product_name),
                escape_html(product_url),
                escape_html(reason),
                checked_at.format(TIMESTAMP_FORMAT),
            ),
        }
    }

    fn format_text_body(&self, event: &NotificationEvent) -> String {
        let mut text = String::new();

        match event {
            NotificationEvent::PriceAlert {
                product_name,
                product_url,
                quote,
                target,
                savings,
                checked_at,
            } => {
                let currency = quote.currency();
                text.push_str("PRICE DROP ALERT\n\n");
                text.push_str(&format!("{} is now available at your target price!\n\n", product_name));
                text.push_str(&format!("Current Price: {}\n", quote.formatted()));
                text.push_str(&format!("Target Price: {}\n", currency.format(*target)));
                text.push_str(&format!("Savings: {}\n\n", currency.format(*savings)));
                text.push_str(&format!("View Product: {}\n", product_url));
                text.push_str(&format!("Checked at: {}\n", checked_at.format(TIMESTAMP_FORMAT)));
            }
            NotificationEvent::CheckFailed {
                product_name,
                product_url,
                reason,
                checked_at,
            } => {
                text.push_str(&format!("Failed to check price for {}\n\n", product_name));
                text.push_str(&format!("URL: {}\n", product_url));
                text.push_str(&format!("Reason: {}\n", reason));
                text.push_str(&format!("Time: {}\n", checked_at.format(TIMESTAMP_FORMAT)));
            }
        }

        text
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl NotifierPlugin for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        let email = self.render(event);
        self.transport.send(&email).await?;

        Ok(NotificationResult {
            recipient: self.to_email.clone(),
        })
    }
}
