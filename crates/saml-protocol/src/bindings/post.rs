//! HTTP-POST binding.
//!
//! The message travels uncompressed, base64-encoded in a hidden form field
//! that the user agent posts to the destination.

use base64::Engine;

use super::{decode_base64, select_message, utf8, DecodedMessage, SamlMessageType, RELAY_STATE};
use crate::error::SamlResult;

/// HTTP-POST binding encoder/decoder.
pub struct HttpPostBinding;

impl HttpPostBinding {
    /// Returns the form payload: base64 of the uncompressed XML.
    #[must_use]
    pub fn encode_payload(xml: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(xml)
    }

    /// Renders an HTML page whose form posts the message to `destination`
    /// as soon as it loads.
    #[must_use]
    pub fn encode(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
        message_type: SamlMessageType,
    ) -> String {
        let mut fields = hidden_input(message_type.form_param(), &Self::encode_payload(xml));
        if let Some(rs) = relay_state {
            fields.push_str(&hidden_input(RELAY_STATE, rs));
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Redirecting</title></head>
<body onload="document.forms[0].submit()">
<form method="post" action="{action}">
{fields}<noscript><button type="submit">Continue</button></noscript>
</form>
</body>
</html>"#,
            action = html_escape(destination),
        )
    }

    /// Decodes a SAML message from already URL-decoded form fields.
    ///
    /// # Errors
    ///
    /// Returns `Transport` when neither message field is present or the XML
    /// is not UTF-8, and `Base64Decode` for a corrupt payload.
    pub fn decode(
        saml_request: Option<&str>,
        saml_response: Option<&str>,
        relay_state: Option<&str>,
    ) -> SamlResult<DecodedMessage> {
        let (encoded, message_type) = select_message(saml_request, saml_response)?;
        Ok(DecodedMessage {
            xml: utf8(decode_base64(encoded)?)?,
            message_type,
            relay_state: relay_state.map(str::to_string),
        })
    }
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"{name}\" value=\"{}\"/>\n",
        html_escape(value)
    )
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
