//! Consistent numbering for "Video/Part/Lesson N" style titles.
//!
//! A batch that spells any number with a leading zero ("Part 07") is treated
//! as zero-padded, and every single-digit number in it is rendered with two
//! digits. Otherwise numbers are rendered in minimal form.

use crate::error::Result;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct NumberNormalizer {
    padded_probe: Regex,
    numbered: Regex,
}

impl NumberNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            padded_probe: Regex::new(r"(?i)(?:video|part|lesson)[\s_-]+0[1-9]")?,
            numbered: Regex::new(r"(?i)(video|part|lesson)([\s_-]+)(\d+)")?,
        })
    }

    /// Whether any title in the batch writes a number with a leading zero
    pub fn uses_zero_padding<'a, I>(&self, titles: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        titles.into_iter().any(|t| self.padded_probe.is_match(t))
    }

    /// Rewrite the first numbered keyword in `title`; all other text is kept verbatim
    pub fn normalize(&self, title: &str, zero_pad: bool) -> String {
        let digits = match self.numbered.captures(title).and_then(|caps| caps.get(3)) {
            Some(m) => m,
            None => return title.to_string(),
        };

        let mut out = String::with_capacity(title.len() + 1);
        out.push_str(&title[..digits.start()]);
        out.push_str(&format_number(digits.as_str(), zero_pad));
        out.push_str(&title[digits.end()..]);
        out
    }

    /// Normalize every title using the batch itself as convention context
    pub fn normalize_batch<S: AsRef<str>>(&self, titles: &[S]) -> Vec<String> {
        let zero_pad = self.uses_zero_padding(titles.iter().map(|t| t.as_ref()));
        titles
            .iter()
            .map(|t| self.normalize(t.as_ref(), zero_pad))
            .collect()
    }
}

/// Values 1-9 get two digits under the padded convention; everything else is minimal
fn format_number(digits: &str, zero_pad: bool) -> String {
    let minimal = digits.trim_start_matches('0');
    if minimal.is_empty() {
        "0".to_string()
    } else if zero_pad && minimal.len() == 1 {
        format!("0{}", minimal)
    } else {
        minimal.to_string()
    }
}
