//! I/O utilities for CSV reading, encoding, delimiter resolution, and output.
//!
//! The engine itself works on bytes; this module is where bytes come from and
//! where rendered documents go:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: field decoding via `encoding_rs`, defaulting to UTF-8.
//! - **Reader construction**: a flexible `csv::Reader` so that ragged rows reach
//!   the ingestion layer instead of aborting the parse.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.
//! - **Digests**: SHA-256 of the raw input, used as a cache key.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use sha2::{Digest, Sha256};

use crate::error::ParseError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const UTF8_BOM: char = '\u{feff}';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, ParseError> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| ParseError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Decodes a single field, returning `None` when the bytes are not valid in
/// `encoding`.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    (!had_errors).then(|| text.into_owned())
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Option<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn decode_headers(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, ParseError> {
    let mut headers = decode_record(record, encoding).ok_or(ParseError::Encoding {
        encoding: encoding.name(),
    })?;
    if let Some(first) = headers.first_mut()
        && first.starts_with(UTF8_BOM)
    {
        *first = first.trim_start_matches(UTF8_BOM).to_string();
    }
    Ok(headers)
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if is_dash(path) {
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("Reading input from stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Opening input file {path:?}"))?
            .read_to_end(&mut buffer)
            .with_context(|| format!("Reading input file {path:?}"))?;
    }
    Ok(buffer)
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    Ok(writer)
}

/// Lowercase hex SHA-256 of the raw input bytes.
pub fn source_digest(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
