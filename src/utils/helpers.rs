//! Helper functions and utilities
//!
//! This module contains input normalisation used by the conversation flows.

use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

const BIRTH_DATE_FORMAT: &str = "%d.%m.%Y";

fn birth_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("valid birth date regex"))
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]+$").expect("valid phone regex"))
}

/// Trim and lowercase free text for keyword matching
pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Parse a birth date in strict `DD.MM.YYYY` form
pub fn parse_birth_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if !birth_date_pattern().is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, BIRTH_DATE_FORMAT).ok()
}

/// Format a birth date the way applicants type it
pub fn format_birth_date(date: NaiveDate) -> String {
    date.format(BIRTH_DATE_FORMAT).to_string()
}

/// Normalise a Russian phone number to `+7XXXXXXXXXX`.
///
/// A trunk prefix `8` is rewritten to the country code `7`.
pub fn normalize_phone_number(text: &str) -> Option<String> {
    let text = text.trim();
    if !phone_pattern().is_match(text) {
        return None;
    }

    let mut digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 11 && digits.starts_with('8') {
        digits.replace_range(0..1, "7");
    }

    if digits.len() == 11 && digits.starts_with('7') {
        Some(format!("+{}", digits))
    } else {
        None
    }
}

/// Generate a zero padded six digit one-time code
pub fn generate_auth_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:06}", code)
}

/// Generate a unique file name keeping the original extension
pub fn generate_file_name(original_path: &str) -> String {
    let extension = std::path::Path::new(original_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| ".jpg".to_string());

    format!("{}{}", Uuid::new_v4(), extension)
}
