//! Open source support badges

use crate::key::ActivationKey;
use crate::validation::present;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except unreserved URL characters is escaped.
const URL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const BADGE_BASE: &str = "https://img.shields.io/badge";

fn escape(value: &str) -> String {
    utf8_percent_encode(value, URL_ESCAPE).to_string()
}

impl ActivationKey {
    /// Markdown for a badge linking the supported project to the library.
    ///
    /// Only keys that are free for open source and name both a project and
    /// its URL get a badge.
    pub fn badge_markdown(&self) -> Option<String> {
        if !self.free_for_open_source {
            return None;
        }
        let project_name = present(self.project_name.as_deref())?;
        let project_url = present(self.project_url.as_deref())?;

        let label = format!("{} <3 {}", project_name, self.library_name);
        let mut image = format!("{}/{}-brightgreen", BADGE_BASE, escape(&label));
        if let Some(logo) = self.ecosystem.badge_logo() {
            image.push_str(&format!("?logo={}&logoColor=white", escape(logo)));
        }

        Some(format!("[![{}]({})]({})", label, image, project_url))
    }
}
