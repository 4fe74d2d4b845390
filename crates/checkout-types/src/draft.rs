//! The order draft and its form fields.
//!
//! A draft is created empty when the checkout form opens, mutated one field
//! at a time and discarded once the customer leaves the form.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Fields of the checkout form, named as they appear on the wire.
///
/// `Submit` is not an input; it is the slot for submission-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
	FullName,
	Email,
	Phone,
	Province,
	District,
	PostalCode,
	Address,
	Notes,
	PaymentFile,
	Submit,
}

impl FormField {
	/// Text inputs, in form order.
	pub const TEXT_FIELDS: [FormField; 8] = [
		FormField::FullName,
		FormField::Email,
		FormField::Phone,
		FormField::Province,
		FormField::District,
		FormField::PostalCode,
		FormField::Address,
		FormField::Notes,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			FormField::FullName => "fullName",
			FormField::Email => "email",
			FormField::Phone => "phone",
			FormField::Province => "province",
			FormField::District => "district",
			FormField::PostalCode => "postalCode",
			FormField::Address => "address",
			FormField::Notes => "notes",
			FormField::PaymentFile => "paymentFile",
			FormField::Submit => "submit",
		}
	}
}

impl fmt::Display for FormField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a string does not name a form field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
	type Err = UnknownField;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"fullName" => Ok(FormField::FullName),
			"email" => Ok(FormField::Email),
			"phone" => Ok(FormField::Phone),
			"province" => Ok(FormField::Province),
			"district" => Ok(FormField::District),
			"postalCode" => Ok(FormField::PostalCode),
			"address" => Ok(FormField::Address),
			"notes" => Ok(FormField::Notes),
			"paymentFile" => Ok(FormField::PaymentFile),
			"submit" => Ok(FormField::Submit),
			other => Err(UnknownField(other.to_string())),
		}
	}
}

/// Where the bytes of an attached payment slip come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlipSource {
	/// Bytes already held in memory, e.g. a multipart upload.
	Bytes(Bytes),
	/// A file on disk, read when the slip is encoded.
	Path(PathBuf),
	/// A `data:<mime>;base64,<payload>` URL as produced by a browser file reader.
	DataUrl(String),
}

/// An uploaded payment slip (bank transfer receipt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSlip {
	/// Original file name as chosen by the customer.
	pub file_name: String,
	/// MIME type declared by the client. Only this is checked, never the content.
	pub mime_type: String,
	pub source: SlipSource,
}

impl PaymentSlip {
	pub fn from_bytes(
		file_name: impl Into<String>,
		mime_type: impl Into<String>,
		bytes: impl Into<Bytes>,
	) -> Self {
		Self {
			file_name: file_name.into(),
			mime_type: mime_type.into(),
			source: SlipSource::Bytes(bytes.into()),
		}
	}

	pub fn from_path(
		file_name: impl Into<String>,
		mime_type: impl Into<String>,
		path: impl Into<PathBuf>,
	) -> Self {
		Self {
			file_name: file_name.into(),
			mime_type: mime_type.into(),
			source: SlipSource::Path(path.into()),
		}
	}

	/// Builds a slip from a data URL, taking the MIME type from its header.
	///
	/// A URL without a `data:<mime>;` header yields an empty MIME type, which
	/// the file-type check rejects.
	pub fn from_data_url(file_name: impl Into<String>, data_url: impl Into<String>) -> Self {
		let data_url = data_url.into();
		let mime_type = data_url_mime_type(&data_url).unwrap_or_default().to_string();
		Self {
			file_name: file_name.into(),
			mime_type,
			source: SlipSource::DataUrl(data_url),
		}
	}
}

/// Extracts `image/png` from `data:image/png;base64,...`.
pub fn data_url_mime_type(data_url: &str) -> Option<&str> {
	let header = data_url.strip_prefix("data:")?;
	let (header, _) = header.split_once(',')?;
	let mime = header.split(';').next()?;
	(!mime.is_empty()).then_some(mime)
}

/// The in-progress order as typed by the customer.
///
/// The attached slip is never serialised, so the JSON form of a draft is
/// exactly what the confirmation view reads back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDraft {
	pub full_name: String,
	pub email: String,
	pub phone: String,
	pub province: String,
	pub district: String,
	pub postal_code: String,
	pub address: String,
	pub notes: String,
	#[serde(skip)]
	pub payment_slip: Option<PaymentSlip>,
}

impl OrderDraft {
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads a text field. Returns `None` for `PaymentFile` and `Submit`.
	pub fn get(&self, field: FormField) -> Option<&str> {
		let value = match field {
			FormField::FullName => &self.full_name,
			FormField::Email => &self.email,
			FormField::Phone => &self.phone,
			FormField::Province => &self.province,
			FormField::District => &self.district,
			FormField::PostalCode => &self.postal_code,
			FormField::Address => &self.address,
			FormField::Notes => &self.notes,
			FormField::PaymentFile | FormField::Submit => return None,
		};
		Some(value.as_str())
	}

	/// Writes a text field. Returns `false` if `field` is not a text input.
	pub fn set(&mut self, field: FormField, value: impl Into<String>) -> bool {
		let slot = match field {
			FormField::FullName => &mut self.full_name,
			FormField::Email => &mut self.email,
			FormField::Phone => &mut self.phone,
			FormField::Province => &mut self.province,
			FormField::District => &mut self.district,
			FormField::PostalCode => &mut self.postal_code,
			FormField::Address => &mut self.address,
			FormField::Notes => &mut self.notes,
			FormField::PaymentFile | FormField::Submit => return false,
		};
		*slot = value.into();
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_field_names_round_trip() {
		for field in FormField::TEXT_FIELDS {
			assert_eq!(field.as_str().parse::<FormField>(), Ok(field));
		}
		assert!("payment_file".parse::<FormField>().is_err());
	}

	#[test]
	fn test_draft_serialises_without_slip() {
		let mut draft = OrderDraft::new();
		draft.set(FormField::FullName, "Somchai");
		draft.payment_slip = Some(PaymentSlip::from_bytes("slip.png", "image/png", vec![1, 2]));

		let json = serde_json::to_value(&draft).unwrap();
		assert_eq!(json["fullName"], "Somchai");
		assert!(json.get("paymentSlip").is_none());
		assert_eq!(json.as_object().unwrap().len(), 8);
	}

	#[test]
	fn test_draft_tolerates_missing_fields() {
		let draft: OrderDraft = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
		assert_eq!(draft.email, "a@b.co");
		assert_eq!(draft.full_name, "");
	}

	#[test]
	fn test_set_rejects_non_text_fields() {
		let mut draft = OrderDraft::new();
		assert!(!draft.set(FormField::PaymentFile, "x"));
		assert!(!draft.set(FormField::Submit, "x"));
		assert!(draft.set(FormField::Notes, "leave at door"));
		assert_eq!(draft.get(FormField::Notes), Some("leave at door"));
	}

	#[test]
	fn test_data_url_mime_type() {
		assert_eq!(
			data_url_mime_type("data:image/jpeg;base64,AAAA"),
			Some("image/jpeg")
		);
		assert_eq!(data_url_mime_type("data:;base64,AAAA"), None);
		assert_eq!(data_url_mime_type("AAAA"), None);

		let slip = PaymentSlip::from_data_url("slip.pdf", "data:application/pdf;base64,JVBERi0=");
		assert_eq!(slip.mime_type, "application/pdf");
	}
}
