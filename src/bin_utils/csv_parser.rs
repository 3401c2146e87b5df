use std::io::Read;

use csv::{Reader, StringRecord, Trim};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Token,
    Registry,
}

/// One signed call: `account` signs a call to `entrypoint` of `contract`.
#[derive(Debug, Deserialize)]
pub struct ScenarioRow {
    pub account: u64,
    pub contract: ContractKind,
    pub entrypoint: String,
    #[serde(default)]
    pub args: String,
}

/// Parses a scenario in CSV format, yielding each row with its line number.
pub struct CsvScenarioParser<R> {
    reader: Reader<R>,
    headers: StringRecord,
    failed: bool,
}

impl<R> CsvScenarioParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        let headers = reader.headers()?.clone();

        Ok(Self {
            reader,
            headers,
            failed: false,
        })
    }
}

impl<R> Iterator for CsvScenarioParser<R>
where
    R: Read,
{
    type Item = (u64, Result<ScenarioRow, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(false) => None,
            Ok(true) => {
                let line = record.position().map_or(0, |pos| pos.line());
                Some((line, record.deserialize(Some(&self.headers))))
            }
            Err(err) => {
                // the reader cannot be trusted past a read error
                self.failed = true;
                let line = err.position().map_or(0, |pos| pos.line());
                Some((line, Err(err)))
            }
        }
    }
}
