//! Turns an attached payment slip into base64 text for the JSON payload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use checkout_types::{EncodedSlip, PaymentSlip, SlipSource};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EncodeError {
	/// The file could not be read (removed, permission revoked, ...).
	#[error("Failed to read payment slip '{file_name}': {source}")]
	Read {
		file_name: String,
		#[source]
		source: std::io::Error,
	},

	/// A data URL whose payload is not valid base64.
	#[error("Payment slip '{0}' is not a valid base64 data URL")]
	MalformedDataUrl(String),
}

/// Drops a leading `data:<mime>;base64,` header, if present.
pub fn strip_data_url_prefix(data_url: &str) -> &str {
	match data_url.strip_prefix("data:") {
		Some(rest) => rest.split_once(',').map_or(data_url, |(_, payload)| payload),
		None => data_url,
	}
}

/// Reads the slip and encodes it as standard, padded base64.
pub async fn encode_payment_slip(slip: &PaymentSlip) -> Result<EncodedSlip, EncodeError> {
	let data = match &slip.source {
		SlipSource::Bytes(bytes) => STANDARD.encode(bytes),
		SlipSource::Path(path) => {
			let bytes = fs::read(path).await.map_err(|source| EncodeError::Read {
				file_name: slip.file_name.clone(),
				source,
			})?;
			STANDARD.encode(bytes)
		}
		SlipSource::DataUrl(url) => {
			let payload = strip_data_url_prefix(url);
			if STANDARD.decode(payload).is_err() {
				return Err(EncodeError::MalformedDataUrl(slip.file_name.clone()));
			}
			payload.to_string()
		}
	};

	debug!(file_name = %slip.file_name, encoded_len = data.len(), "Encoded payment slip");

	Ok(EncodedSlip {
		data,
		file_name: slip.file_name.clone(),
		mime_type: slip.mime_type.clone(),
	})
}
