use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use pixel_office_core::LayoutSnapshot;
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "office";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const SNAPSHOT_HEADER: &str = "office:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a layout into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(layout: &LayoutSnapshot) -> Result<String, LayoutTransferError> {
    let json = serde_json::to_vec(layout).map_err(LayoutTransferError::Serialize)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!(
        "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
        layout.columns, layout.rows
    ))
}

/// Decodes a layout from its clipboard string representation.
///
/// The dimensions in the header must agree with the payload; structural
/// validation of the layout itself is left to the world.
pub(crate) fn decode(value: &str) -> Result<LayoutSnapshot, LayoutTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayoutTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
    let dimensions = parts
        .next()
        .ok_or(LayoutTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LayoutTransferError::InvalidEncoding)?;
    let layout: LayoutSnapshot =
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

    if (layout.columns, layout.rows) != (columns, rows) {
        return Err(LayoutTransferError::DimensionMismatch {
            header: (columns, rows),
            payload: (layout.columns, layout.rows),
        });
    }
    Ok(layout)
}

/// Errors that can occur while encoding or decoding layout transfer strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded layout.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded layout did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded layout did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded layout did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded layout used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded layout.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The header dimensions disagree with the decoded layout.
    #[error(
        "header declares a {}x{} grid but the payload is {}x{}",
        header.0, header.1, payload.0, payload.1
    )]
    DimensionMismatch {
        /// Dimensions named in the header.
        header: (u32, u32),
        /// Dimensions of the decoded layout.
        payload: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload")]
    InvalidPayload(#[source] serde_json::Error),
    /// The layout could not be serialised.
    #[error("could not serialise layout")]
    Serialize(#[source] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
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
    use pixel_office_core::{
        CellCoord, FurnitureKind, FurnitureRecord, FurnitureUid, PixelTextConfig, TileType,
    };

    use super::*;

    #[test]
    fn furnished_layout_survives_transfer() {
        let mut layout = LayoutSnapshot::filled(12, 8, TileType::FLOOR);
        layout.tiles[0] = TileType::Wall;
        layout.furniture.push(FurnitureRecord::new(
            FurnitureUid::new(1),
            FurnitureKind::Desk,
            CellCoord::new(2, 3),
        ));
        layout.furniture.push(
            FurnitureRecord::new(
                FurnitureUid::new(2),
                FurnitureKind::PixelText,
                CellCoord::new(6, 1),
            )
            .with_text(PixelTextConfig::new("hello")),
        );

        let encoded = encode(&layout).expect("layout encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:12x8:")));
        assert!(!encoded.contains('='), "payload is unpadded");

        let decoded = decode(&format!("  {encoded}\n")).expect("layout decodes");
        assert_eq!(decoded, layout);
    }

    #[test]
    fn foreign_prefixes_are_rejected() {
        let error = decode("room:v1:4x4:e30").expect_err("wrong domain");
        assert!(matches!(error, LayoutTransferError::InvalidPrefix(prefix) if prefix == "room"));

        let error = decode("office:v2:4x4:e30").expect_err("wrong version");
        assert!(matches!(error, LayoutTransferError::UnsupportedVersion(_)));
    }

    #[test]
    fn truncated_strings_name_the_missing_segment() {
        assert!(matches!(decode("   "), Err(LayoutTransferError::EmptyPayload)));
        assert!(matches!(
            decode("office:v1"),
            Err(LayoutTransferError::MissingDimensions)
        ));
        assert!(matches!(
            decode("office:v1:4x4"),
            Err(LayoutTransferError::MissingPayload)
        ));
    }

    #[test]
    fn dimensions_must_be_positive_and_match_the_payload() {
        assert!(matches!(
            decode("office:v1:0x4:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("office:v1:four:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));

        let encoded = encode(&LayoutSnapshot::filled(3, 2, TileType::FLOOR)).expect("encodes");
        let tampered = encoded.replacen(":3x2:", ":2x3:", 1);
        assert!(matches!(
            decode(&tampered),
            Err(LayoutTransferError::DimensionMismatch {
                header: (2, 3),
                payload: (3, 2),
            })
        ));
    }

    #[test]
    fn corrupt_payloads_are_reported() {
        assert!(matches!(
            decode("office:v1:4x4:***"),
            Err(LayoutTransferError::InvalidEncoding(_))
        ));
        let not_a_layout = STANDARD_NO_PAD.encode(b"[1,2,3]");
        assert!(matches!(
            decode(&format!("office:v1:4x4:{not_a_layout}")),
            Err(LayoutTransferError::InvalidPayload(_))
        ));
    }
}
