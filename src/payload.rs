use askama::Template;

use crate::config::SourceConfig;
use crate::constants::CALLER_NAME;
use crate::error::Result;

/// The `exportData`-style call document sent to the API. Values are XML-escaped.
#[derive(Template)]
#[template(path = "export_data.xml")]
pub struct ExportDataCall<'a> {
    pub method: &'a str,
    pub caller_name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub version: &'a str,
    pub accounts: &'a [String],
    pub start: &'a str,
    pub end: &'a str,
    pub dimensions: &'a [String],
}

impl<'a> ExportDataCall<'a> {
    /// A call covering exactly one period, `date_selected`.
    pub fn single_period(config: &'a SourceConfig) -> Self {
        let method = &config.method_obj;
        Self::spanning(config, &method.date_selected, &method.date_selected)
    }

    /// A call from `date_selected` through `date_end` (or a single period when unset).
    pub fn date_range(config: &'a SourceConfig) -> Self {
        let method = &config.method_obj;
        let end = method.date_end.as_deref().unwrap_or(&method.date_selected);
        Self::spanning(config, &method.date_selected, end)
    }

    fn spanning(config: &'a SourceConfig, start: &'a str, end: &'a str) -> Self {
        Self {
            method: &config.method_obj.method,
            caller_name: CALLER_NAME,
            username: &config.username,
            password: &config.password,
            version: &config.method_obj.version,
            accounts: &config.method_obj.accounts,
            start,
            end,
            dimensions: &config.method_obj.dimensions,
        }
    }

    pub fn to_xml(&self) -> Result<String> {
        Ok(self.render()?)
    }
}
