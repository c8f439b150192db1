//! Output projection: render one result row per matching pair

use std::io::Write;

use crate::engine::operator::{DerivedStat, OutputField, QueryOp, QueryScratch};
use crate::engine::{FIELD_SEPARATOR, LINE_TERMINATOR};
use crate::error::{Result, TileJoinError};

/// Write one result row for the pair `(fields_1, fields_2)`
///
/// With no configured output fields every raw field of the first side is
/// emitted followed by every raw field of the second; `emit_second_default`
/// disables that second half for the cache single-window path. Listed fields
/// resolve against their tagged source, derived codes against the scratch.
pub fn write_row<W: Write>(
    output: &mut W,
    op: &QueryOp,
    scratch: &QueryScratch,
    fields_1: &[String],
    fields_2: &[String],
    emit_second_default: bool,
) -> Result<()> {
    if op.output_fields.is_empty() {
        let mut first = true;
        for field in fields_1 {
            if !first {
                write!(output, "{FIELD_SEPARATOR}")?;
            }
            write!(output, "{field}")?;
            first = false;
        }
        if emit_second_default {
            for field in fields_2 {
                if !first {
                    write!(output, "{FIELD_SEPARATOR}")?;
                }
                write!(output, "{field}")?;
                first = false;
            }
        }
    } else {
        for (position, field) in op.output_fields.iter().enumerate() {
            if position > 0 {
                write!(output, "{FIELD_SEPARATOR}")?;
            }
            match field {
                OutputField::First(idx) => {
                    write!(output, "{}", raw_field(fields_1, *idx, "1")?)?;
                }
                OutputField::Second(idx) => {
                    write!(output, "{}", raw_field(fields_2, *idx, "2")?)?;
                }
                OutputField::Stat(stat) => write_stat(output, scratch, *stat)?,
            }
        }
    }
    write!(output, "{LINE_TERMINATOR}")?;
    Ok(())
}

fn raw_field<'a>(fields: &'a [String], idx: usize, side: &str) -> Result<&'a str> {
    fields.get(idx).map(String::as_str).ok_or_else(|| {
        TileJoinError::Schema(format!(
            "output field position {idx} is out of range for set {side}"
        ))
    })
}

fn write_stat<W: Write>(output: &mut W, scratch: &QueryScratch, stat: DerivedStat) -> Result<()> {
    match stat {
        DerivedStat::Area1 => write!(output, "{}", scratch.area_1)?,
        DerivedStat::Area2 => write!(output, "{}", scratch.area_2)?,
        DerivedStat::UnionArea => write!(output, "{}", scratch.union_area)?,
        DerivedStat::IntersectArea => write!(output, "{}", scratch.intersect_area)?,
        DerivedStat::Jaccard => write!(output, "{}", scratch.jaccard)?,
        DerivedStat::Dice => write!(output, "{}", scratch.dice)?,
        DerivedStat::TileId => write!(output, "{}", scratch.tile_id)?,
        DerivedStat::MinDistance => write!(output, "{}", scratch.distance)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::operator::JoinPredicate;

    fn op_with_fields(output_fields: Vec<OutputField>) -> QueryOp {
        QueryOp {
            join_cardinality: 2,
            shape_idx_1: 2,
            shape_idx_2: 2,
            join_predicate: JoinPredicate::Intersects,
            expansion_distance: 0.0,
            k: 1,
            earth_distance: false,
            output_fields,
            use_cache_file: false,
            cache_file_path: None,
        }
    }

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_default_projection_emits_both_sides() {
        let op = op_with_fields(vec![]);
        let scratch = QueryScratch::default();
        let mut out = Vec::new();

        write_row(
            &mut out,
            &op,
            &scratch,
            &fields(&["T1", "1", "a"]),
            &fields(&["T1", "2", "b"]),
            true,
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "T1\t1\ta\tT1\t2\tb\n");
    }

    #[test]
    fn test_default_projection_window_mode_skips_second() {
        let op = op_with_fields(vec![]);
        let scratch = QueryScratch::default();
        let mut out = Vec::new();

        write_row(
            &mut out,
            &op,
            &scratch,
            &fields(&["POINT(5 5)", "x"]),
            &fields(&["WINDOW"]),
            false,
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "POINT(5 5)\tx\n");
    }

    #[test]
    fn test_listed_fields_and_stats() {
        let op = op_with_fields(vec![
            OutputField::First(0),
            OutputField::Second(2),
            OutputField::Stat(DerivedStat::MinDistance),
            OutputField::Stat(DerivedStat::TileId),
        ]);
        let scratch = QueryScratch {
            distance: 1.0,
            tile_id: "T9".to_string(),
            ..Default::default()
        };
        let mut out = Vec::new();

        write_row(
            &mut out,
            &op,
            &scratch,
            &fields(&["a0", "a1"]),
            &fields(&["b0", "b1", "b2"]),
            true,
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "a0\tb2\t1\tT9\n");
    }

    #[test]
    fn test_out_of_range_field_is_schema_error() {
        let op = op_with_fields(vec![OutputField::Second(5)]);
        let scratch = QueryScratch::default();
        let mut out = Vec::new();

        let err = write_row(&mut out, &op, &scratch, &fields(&["a"]), &fields(&["b"]), true);
        assert!(matches!(err, Err(TileJoinError::Schema(_))));
    }
}
