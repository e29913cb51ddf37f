use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use thiserror::Error;
use tower_platformer_world::{LevelDescription, LevelError};

const CODE_DOMAIN: &str = "tower";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const CODE_HEADER: &str = "tower:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a level into a single-line string suitable for pasting.
pub(crate) fn encode(level: &LevelDescription) -> Result<String, TransferError> {
    let json = level.to_json()?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{CODE_HEADER}:{}x{}:{encoded}",
        level.columns, level.rows
    ))
}

/// Decodes and validates a level from its single-line representation.
pub(crate) fn decode(value: &str) -> Result<LevelDescription, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(4, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(TransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != CODE_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let json = String::from_utf8(bytes).map_err(|_| TransferError::NotUtf8)?;
    let level = LevelDescription::from_json(&json)?;

    if level.columns != columns || level.rows != rows {
        return Err(TransferError::DimensionMismatch {
            header: (columns, rows),
            payload: (level.columns, level.rows),
        });
    }
    Ok(level)
}

/// Errors that can occur while encoding or decoding level codes.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("level code was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the code.
    #[error("level code is missing the prefix")]
    MissingPrefix,
    /// The code did not contain a version segment.
    #[error("level code is missing the version")]
    MissingVersion,
    /// The code did not include grid dimensions.
    #[error("level code is missing the grid dimensions")]
    MissingDimensions,
    /// The code did not include the payload segment.
    #[error("level code is missing the payload")]
    MissingPayload,
    /// The code used an unexpected prefix segment.
    #[error("level code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("level code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode level payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload was not UTF-8 text.
    #[error("level payload is not UTF-8")]
    NotUtf8,
    /// The payload did not describe a valid level.
    #[error("invalid level payload: {0}")]
    Level(#[from] LevelError),
    /// The header dimensions disagree with the payload.
    #[error("header declares {}x{} but the level is {}x{}", .header.0, .header.1, .payload.0, .payload.1)]
    DimensionMismatch {
        /// Columns and rows declared in the header.
        header: (u32, u32),
        /// Columns and rows of the decoded level.
        payload: (u32, u32),
    },
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), TransferError> {
    let invalid = || TransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_platformer_world::LevelMap;

    fn sample() -> LevelDescription {
        LevelDescription::from_map(&LevelMap {
            name: "sample".to_owned(),
            map: vec![
                "  o  H  ".to_owned(),
                " P   H S".to_owned(),
                "XXXXXXXX".to_owned(),
            ],
        })
        .expect("valid map")
    }

    #[test]
    fn codes_carry_the_header_and_dimensions() {
        let level = sample();

        let code = encode(&level).expect("level encodes");
        assert!(code.starts_with(&format!("{CODE_HEADER}:8x3:")));
        assert!(!code.contains('\n'));

        let decoded = decode(&format!("  {code}\n")).expect("code decodes");
        assert_eq!(decoded, level);
    }

    #[test]
    fn foreign_prefixes_and_versions_are_rejected() {
        assert!(matches!(decode(""), Err(TransferError::EmptyPayload)));
        assert!(matches!(
            decode("castle:v1:2x2:abc"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "castle"
        ));
        assert!(matches!(
            decode("tower:v9:2x2:abc"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(
            decode("tower:v1:2x2"),
            Err(TransferError::MissingPayload)
        ));
        assert!(matches!(
            decode("tower:v1:0x2:abc"),
            Err(TransferError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn header_must_match_the_payload() {
        let code = encode(&sample()).expect("level encodes");
        let tampered = code.replacen(":8x3:", ":9x3:", 1);

        assert!(matches!(
            decode(&tampered),
            Err(TransferError::DimensionMismatch {
                header: (9, 3),
                payload: (8, 3)
            })
        ));
    }

    #[test]
    fn invalid_payloads_surface_level_errors() {
        let json = r#"{"name":"bad","columns":2,"rows":1,"layout":[{}],"player":{"column":5,"row":0}}"#;
        let code = format!("{CODE_HEADER}:2x1:{}", STANDARD_NO_PAD.encode(json));

        assert!(matches!(
            decode(&code),
            Err(TransferError::Level(LevelError::PlayerOutOfBounds { .. }))
        ));
        assert!(matches!(
            decode("tower:v1:2x1:!!!"),
            Err(TransferError::InvalidEncoding(_))
        ));
    }
}
