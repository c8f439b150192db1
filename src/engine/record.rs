//! Input record parsing

use crate::engine::operator::Sid;
use crate::engine::FIELD_SEPARATOR;
use crate::error::{Result, TileJoinError};

/// One parsed input line: tile id, set id, and the full raw field list
/// (positions 0 and 1 repeat the tile and set ids)
#[derive(Debug, Clone)]
pub struct Record {
    pub tile_id: String,
    pub sid: Sid,
    pub fields: Vec<String>,
}

/// Split a tab-separated line into a record
///
/// The two mandatory fields are the tile id at position 0 and the set id at
/// position 1; a line without both is malformed.
pub fn parse_record(line: &str) -> Result<Record> {
    let fields: Vec<String> = line.split(FIELD_SEPARATOR).map(str::to_string).collect();
    if fields.len() < 2 {
        return Err(TileJoinError::Schema(format!(
            "record has {} fields, expected at least a tile id and a set id",
            fields.len()
        )));
    }
    let sid = Sid::from_field(&fields[1])?;
    Ok(Record {
        tile_id: fields[0].clone(),
        sid,
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let record = parse_record("T1\t2\tPOINT(1 2)\textra").unwrap();
        assert_eq!(record.tile_id, "T1");
        assert_eq!(record.sid, Sid::Two);
        assert_eq!(record.fields.len(), 4);
        assert_eq!(record.fields[2], "POINT(1 2)");
    }

    #[test]
    fn test_preserves_empty_fields() {
        let record = parse_record("T1\t1\t\tname").unwrap();
        assert_eq!(record.fields[2], "");
        assert_eq!(record.fields[3], "name");
    }

    #[test]
    fn test_rejects_short_or_bad_lines() {
        assert!(parse_record("T1").is_err());
        assert!(parse_record("T1\t9\tPOINT(0 0)").is_err());
    }
}
