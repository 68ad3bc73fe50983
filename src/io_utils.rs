//! Table reading and serialization.
//!
//! All file I/O in csv-repair flows through this module:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Decoding**: input fields are decoded via `encoding_rs`, defaulting to UTF-8.
//! - **Reading**: records are read with flexible lengths since drifted rows
//!   rarely match the header width; the first record is the header.
//! - **Serializing**: minimal quoting (only cells holding the delimiter, a
//!   quote, or a line break) with doubled-quote escaping. Output is rendered in
//!   memory and written in one go so a failed run never leaves a partial file.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::{self, File},
    io::{self, BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::{QuoteStyle, Terminator};
use encoding_rs::{Encoding, UTF_8};

use crate::table::Table;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_output_delimiter(path: Option<&Path>, fallback: u8) -> u8 {
    if let Some(path) = path {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => return DEFAULT_TSV_DELIMITER,
            Some(ext) if ext.eq_ignore_ascii_case("csv") => return DEFAULT_CSV_DELIMITER,
            _ => {}
        }
    }
    fallback
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

/// Reads a whole table. The first record becomes the header; an empty source
/// yields an empty table.
pub fn read_table<R>(reader: R, delimiter: u8, encoding: &'static Encoding) -> Result<Table>
where
    R: Read,
{
    let mut reader = open_csv_reader(reader, delimiter);
    let mut records = reader.byte_records();
    let headers = match records.next() {
        Some(record) => {
            let record = record.context("Reading header row")?;
            decode_record(&record, encoding)?
        }
        None => return Ok(Table::default()),
    };
    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
        rows.push(
            decode_record(&record, encoding).with_context(|| format!("Decoding row {}", idx + 2))?,
        );
    }
    Ok(Table::new(headers, rows))
}

pub fn read_table_from_path(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Table> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    read_table(reader, delimiter, encoding).with_context(|| format!("Reading table from {path:?}"))
}

/// Serializes the header and all rows, quoting only where necessary.
pub fn serialize_table(table: &Table, delimiter: u8) -> Result<Vec<u8>> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'));
    let mut writer = builder.from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .context("Writing output headers")?;
    for (idx, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing output row {}", idx + 2))?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing output buffer: {}", err.error()))
}

pub fn serialize_to_string(table: &Table, delimiter: u8) -> Result<String> {
    let bytes = serialize_table(table, delimiter)?;
    String::from_utf8(bytes).context("Serialized table is not valid UTF-8")
}

/// Writes the serialized table to `path`, or stdout when the path is absent or `-`.
pub fn write_table(table: &Table, path: Option<&Path>, delimiter: u8) -> Result<()> {
    let bytes = serialize_table(table, delimiter)?;
    match path {
        Some(p) if !is_dash(p) => {
            fs::write(p, bytes).with_context(|| format!("Writing output file {p:?}"))
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).context("Writing to stdout")?;
            stdout.flush().context("Flushing stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn read_table_keeps_ragged_rows() {
        let input = "ID,ITEM,PRICE\n1,Churro,$5\nFries,Snacks\n2,\"Dole Whip, float\",6,extra\n";
        let table = read_table(input.as_bytes(), b',', UTF_8).expect("read");
        assert_eq!(table.headers, vec!["ID", "ITEM", "PRICE"]);
        assert_eq!(table.rows[1], vec!["Fries", "Snacks"]);
        assert_eq!(table.rows[2], vec!["2", "Dole Whip, float", "6", "extra"]);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = read_table("".as_bytes(), b',', UTF_8).expect("read");
        assert_eq!(table, Table::default());
    }

    #[test]
    fn read_table_decodes_legacy_encodings() {
        let bytes = b"ITEM\nCr\xe8me br\xfbl\xe9e\n";
        let table = read_table(&bytes[..], b',', WINDOWS_1252).expect("read");
        assert_eq!(table.rows[0][0], "Crème brûlée");
    }

    #[test]
    fn serializer_quotes_only_when_needed() {
        let table = Table::from_strs(
            &["ID", "DESCRIPTION"],
            &[
                &["1", "plain"],
                &["2", "salt, pepper"],
                &["3", "the \"big\" one"],
                &["4", "two\nlines"],
            ],
        );
        let out = serialize_to_string(&table, b',').expect("serialize");
        assert_eq!(
            out,
            "ID,DESCRIPTION\n1,plain\n2,\"salt, pepper\"\n3,\"the \"\"big\"\" one\"\n4,\"two\nlines\"\n"
        );
    }

    #[test]
    fn serializer_accepts_ragged_rows() {
        let table = Table::from_strs(&["A", "B"], &[&["1"], &["1", "2", "3"]]);
        let out = serialize_to_string(&table, b'\t').expect("serialize");
        assert_eq!(out, "A\tB\n1\n1\t2\t3\n");
    }

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(resolve_input_delimiter(Path::new("menu.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("menu.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("menu.tsv"), Some(b'|')), b'|');
        assert_eq!(resolve_output_delimiter(Some(Path::new("out.tsv")), b','), b'\t');
        assert_eq!(resolve_output_delimiter(None, b';'), b';');
    }
}
