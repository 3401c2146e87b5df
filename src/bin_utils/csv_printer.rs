use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Final state of one address: token balance, plus account and registry data when present.
#[derive(Debug, Serialize)]
pub struct Holder {
    pub address: String,
    pub account: Option<u64>,
    pub balance: String,
    pub nonce: Option<u64>,
    pub l1_address: Option<String>,
}

/// Writes one CSV row per holder, header first.
pub fn write_holders(output: impl Write, holders: &[Holder]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().from_writer(output);
    for holder in holders {
        writer
            .serialize(holder)
            .with_context(|| format!("Cannot write holder {}", holder.address))?;
    }
    writer.flush().context("Cannot flush holders")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_are_blank_columns() {
        let holders = [
            Holder {
                address: "0x1".into(),
                account: Some(0),
                balance: "990".into(),
                nonce: Some(1),
                l1_address: None,
            },
            Holder {
                address: "0x2".into(),
                account: None,
                balance: "10".into(),
                nonce: None,
                l1_address: None,
            },
        ];
        let mut out = Vec::new();
        write_holders(&mut out, &holders).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "address,account,balance,nonce,l1_address\n0x1,0,990,1,\n0x2,,10,,\n"
        );
    }
}
