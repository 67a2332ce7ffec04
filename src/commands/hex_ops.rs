//! Binary patch commands
//!
//! Values are encoded to uppercase hex here; the patcher only ever sees hex.

use super::Ctx;
use crate::error::ScriptError;
use crate::parser::unquote;

/// How a command's value arguments become hex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Encoding {
    /// Already hex
    Raw,
    /// ASCII text
    Ascii,
    /// Decimal number, big-endian bytes
    Decimal,
    /// Decimal number, little-endian bytes
    ReversedDecimal,
}

fn decimal_bytes(dec: &str) -> Result<Vec<u8>, ScriptError> {
    let value: u64 = dec
        .trim()
        .parse()
        .map_err(|_| ScriptError::syntax(format!("not a decimal number: {:?}", dec)))?;
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
    Ok(bytes[first..].to_vec())
}

/// `"255"` → `"FF"`, `"1234"` → `"04D2"`
pub fn decimal_to_hex(dec: &str) -> Result<String, ScriptError> {
    Ok(hex::encode_upper(decimal_bytes(dec)?))
}

/// `"1234"` → `"D204"`
pub fn decimal_to_reversed_hex(dec: &str) -> Result<String, ScriptError> {
    let mut bytes = decimal_bytes(dec)?;
    bytes.reverse();
    Ok(hex::encode_upper(bytes))
}

pub fn ascii_to_hex(text: &str) -> String {
    hex::encode_upper(text.as_bytes())
}

impl Encoding {
    fn encode(self, raw: &str) -> Result<String, ScriptError> {
        let value = unquote(raw);
        match self {
            Encoding::Raw => Ok(value.to_string()),
            Encoding::Ascii => Ok(ascii_to_hex(value)),
            Encoding::Decimal => decimal_to_hex(value),
            Encoding::ReversedDecimal => decimal_to_reversed_hex(value),
        }
    }
}

fn patched(ok: bool, what: &str, file: &str) -> Result<(), ScriptError> {
    if ok {
        Ok(())
    } else {
        Err(ScriptError::collaborator(format!("{} failed for {}", what, file)))
    }
}

pub(super) fn by_offset(ctx: &mut Ctx<'_>, args: &[String]) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let ok = ctx.host.hex.patch_at_offset(&ctx.host_path(&file), unquote(&args[1]), unquote(&args[2]));
    patched(ok, "hex-by-offset", &file)
}

pub(super) fn by_custom_offset(ctx: &mut Ctx<'_>, args: &[String], encoding: Encoding) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let data = encoding.encode(&args[3])?;
    let ok = ctx.host.hex.patch_at_custom_offset(
        &ctx.host_path(&file),
        unquote(&args[1]),
        unquote(&args[2]),
        &data,
    );
    patched(ok, "hex-by-custom-offset", &file)
}

/// `file find replace [occurrence]`; occurrence 0 (the default) replaces all.
pub(super) fn find_replace(ctx: &mut Ctx<'_>, args: &[String], encoding: Encoding) -> Result<(), ScriptError> {
    let file = ctx.path_arg(&args[0]);
    let mut find = encoding.encode(&args[1])?;
    let mut replace = encoding.encode(&args[2])?;

    if encoding == Encoding::Ascii {
        while replace.len() < find.len() {
            replace.push_str("00");
        }
        while find.len() < replace.len() {
            find.push_str("00");
        }
    }

    let occurrence = match args.get(3) {
        Some(n) => unquote(n)
            .trim()
            .parse::<usize>()
            .map_err(|_| ScriptError::syntax(format!("bad occurrence {:?}", n)))?,
        None => 0,
    };

    let ok = ctx.host.hex.find_replace(&ctx.host_path(&file), &find, &replace, occurrence);
    patched(ok, "hex find/replace", &file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_encodings() {
        assert_eq!(decimal_to_hex("255").unwrap(), "FF");
        assert_eq!(decimal_to_hex("1234").unwrap(), "04D2");
        assert_eq!(decimal_to_hex("0").unwrap(), "00");
        assert_eq!(decimal_to_reversed_hex("1234").unwrap(), "D204");
        assert_eq!(decimal_to_reversed_hex("65536").unwrap(), "000001");
        assert!(decimal_to_hex("12a").is_err());
    }

    #[test]
    fn test_ascii_to_hex() {
        assert_eq!(ascii_to_hex("Ab1"), "416231");
        assert_eq!(ascii_to_hex(""), "");
    }

    #[test]
    fn test_encoding_unquotes() {
        assert_eq!(Encoding::Ascii.encode("'hi'").unwrap(), "6869");
        assert_eq!(Encoding::Raw.encode("\"DEAD\"").unwrap(), "DEAD");
    }
}
