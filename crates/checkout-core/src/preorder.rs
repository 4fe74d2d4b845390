//! Pre-order opening time.

use checkout_types::default_pre_order_opening;
use chrono::{Local, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreOrderWindow {
	opens_at: NaiveDateTime,
}

impl PreOrderWindow {
	pub fn new(opens_at: NaiveDateTime) -> Self {
		Self { opens_at }
	}

	pub fn opens_at(&self) -> NaiveDateTime {
		self.opens_at
	}

	pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
		now >= self.opens_at
	}

	/// Checked against the server's local clock.
	pub fn is_open(&self) -> bool {
		self.is_open_at(Local::now().naive_local())
	}
}

impl Default for PreOrderWindow {
	fn default() -> Self {
		Self::new(default_pre_order_opening())
	}
}
