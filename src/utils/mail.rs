use crate::types::MailContext;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{header, Client};

#[derive(Debug)]
pub enum Error {
    NotSent,
}

/// An ordered template substitution variable, sent to the mail API as a
/// `v:{key}` form field.
pub struct EmailVar {
    pub key: String,
    pub value: String,
}

pub async fn send(
    cfg: MailContext,
    subject: String,
    template: String,
    to: String,
    vars: Vec<EmailVar>,
) -> Result<(), Error> {
    let mut form = vec![
        (
            "from".to_string(),
            format!("{} <mailbot@{}>", cfg.sender_name, cfg.domain),
        ),
        ("to".to_string(), to),
        ("subject".to_string(), subject),
        ("template".to_string(), template),
    ];

    for var in vars {
        form.push((format!("v:{}", var.key), var.value));
    }

    let authorization = format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("api:{}", cfg.api_key))
    );

    let res = Client::new()
        .post(format!("{}/{}/messages", cfg.api_endpoint, cfg.domain))
        .header(header::AUTHORIZATION, authorization)
        .form(&form)
        .send()
        .await
        .map_err(|err| {
            tracing::error!("Failed to send email: {:?}", err);
            Error::NotSent
        })?;

    if !res.status().is_success() {
        let data = res.text().await.unwrap_or_default();
        tracing::error!("Mail API rejected the message: {}", data);
        return Err(Error::NotSent);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vars_keep_their_order_and_prefix() {
        let vars = vec![
            EmailVar {
                key: "code".to_string(),
                value: "123".to_string(),
            },
            EmailVar {
                key: "username".to_string(),
                value: "a@b.c".to_string(),
            },
        ];

        let fields: Vec<(String, String)> = vars
            .into_iter()
            .map(|var| (format!("v:{}", var.key), var.value))
            .collect();

        assert_eq!(fields[0].0, "v:code");
        assert_eq!(fields[1].0, "v:username");
    }
}
