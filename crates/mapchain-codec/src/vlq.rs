//! Base64 VLQ encoding of the `mappings` field
//!
//! Generated columns are relative to the previous segment on the same line
//! and reset at every `;`. Source index, original line, original column and
//! name index are relative to the previous occurrence anywhere in the field.

use crate::error::{CodecError, CodecResult};
use crate::types::{Segment, SegmentTable, SourceRef};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION_BIT: u32 = 0b10_0000;
const DIGIT_MASK: u32 = 0b01_1111;
const DIGIT_BITS: u32 = 5;

fn digit_value(byte: u8) -> Option<u32> {
    let value = match byte {
        b'A'..=b'Z' => byte - b'A',
        b'a'..=b'z' => byte - b'a' + 26,
        b'0'..=b'9' => byte - b'0' + 52,
        b'+' => 62,
        b'/' => 63,
        _ => return None,
    };
    Some(u32::from(value))
}

/// Decode one segment's fields into `out`
fn decode_fields(text: &str, line: usize, out: &mut Vec<i64>) -> CodecResult<()> {
    out.clear();
    let mut value: i64 = 0;
    let mut shift: u32 = 0;

    for (offset, byte) in text.bytes().enumerate() {
        let digit = digit_value(byte).ok_or(CodecError::InvalidCharacter {
            character: byte as char,
            line,
        })?;

        if shift > 32 {
            return Err(CodecError::Overflow { line });
        }
        value += i64::from(digit & DIGIT_MASK) << shift;

        if digit & CONTINUATION_BIT != 0 {
            shift += DIGIT_BITS;
            if offset + 1 == text.len() {
                return Err(CodecError::Truncated { line });
            }
            continue;
        }

        let negative = value & 1 == 1;
        value >>= 1;
        out.push(if negative { -value } else { value });
        value = 0;
        shift = 0;
    }

    Ok(())
}

fn apply_delta(base: &mut i64, delta: i64, line: usize) -> CodecResult<u32> {
    *base += delta;
    u32::try_from(*base).map_err(|_| {
        if *base < 0 {
            CodecError::NegativeValue { line }
        } else {
            CodecError::Overflow { line }
        }
    })
}

/// Decode a `mappings` string into a segment table
///
/// Each line is sorted by generated column after decoding.
pub fn decode(mappings: &str) -> CodecResult<SegmentTable> {
    let mut lines = Vec::new();
    let mut fields = Vec::with_capacity(5);

    let mut source: i64 = 0;
    let mut original_line: i64 = 0;
    let mut original_column: i64 = 0;
    let mut name: i64 = 0;

    for (row, line_text) in mappings.split(';').enumerate() {
        let mut generated_column: i64 = 0;
        let mut segments = Vec::new();

        for segment_text in line_text.split(',') {
            if segment_text.is_empty() {
                continue;
            }
            decode_fields(segment_text, row, &mut fields)?;

            let column = apply_delta(&mut generated_column, fields[0], row)?;
            let segment = match fields.len() {
                1 => Segment::unmapped(column),
                4 | 5 => Segment {
                    generated_column: column,
                    source: Some(SourceRef {
                        source: apply_delta(&mut source, fields[1], row)?,
                        line: apply_delta(&mut original_line, fields[2], row)?,
                        column: apply_delta(&mut original_column, fields[3], row)?,
                        name: match fields.get(4) {
                            Some(&delta) => Some(apply_delta(&mut name, delta, row)?),
                            None => None,
                        },
                    }),
                },
                count => {
                    return Err(CodecError::FieldCount { count, line: row });
                }
            };
            segments.push(segment);
        }

        lines.push(segments);
    }

    Ok(SegmentTable::from_lines(lines))
}

fn encode_value(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };

    loop {
        let mut digit = (vlq & i64::from(DIGIT_MASK)) as usize;
        vlq >>= DIGIT_BITS;
        if vlq > 0 {
            digit |= CONTINUATION_BIT as usize;
        }
        out.push(ALPHABET[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Encode a segment table into a `mappings` string
pub fn encode(table: &SegmentTable) -> String {
    let mut out = String::new();

    let mut source: i64 = 0;
    let mut original_line: i64 = 0;
    let mut original_column: i64 = 0;
    let mut name: i64 = 0;

    for (row, line) in table.lines().iter().enumerate() {
        if row > 0 {
            out.push(';');
        }

        let mut generated_column: i64 = 0;
        for (i, segment) in line.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }

            let column = i64::from(segment.generated_column);
            encode_value(&mut out, column - generated_column);
            generated_column = column;

            let Some(origin) = segment.source else {
                continue;
            };

            encode_value(&mut out, i64::from(origin.source) - source);
            source = i64::from(origin.source);
            encode_value(&mut out, i64::from(origin.line) - original_line);
            original_line = i64::from(origin.line);
            encode_value(&mut out, i64::from(origin.column) - original_column);
            original_column = i64::from(origin.column);

            if let Some(index) = origin.name {
                encode_value(&mut out, i64::from(index) - name);
                name = i64::from(index);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_values() {
        let table = decode("A").unwrap();
        assert_eq!(table.line(0).unwrap(), &[Segment::unmapped(0)]);

        // 'D' = 3 -> sign bit set, magnitude 1
        let err = decode("D").unwrap_err();
        assert!(matches!(err, CodecError::NegativeValue { line: 0 }));
    }

    #[test]
    fn test_decode_relative_fields() {
        // AAAA: (0, 0, 0, 0); SAAS: (+9, +0, +0, +9); ;AACA: next line (0, 0, +1, 0)
        let table = decode("AAAA,SAAS;AACA").unwrap();

        assert_eq!(table.line_count(), 2);
        assert_eq!(table.line(0).unwrap()[0], Segment::mapped(0, 0, 0, 0));
        assert_eq!(table.line(0).unwrap()[1], Segment::mapped(9, 0, 0, 9));
        assert_eq!(table.line(1).unwrap()[0], Segment::mapped(0, 0, 1, 9));
    }

    #[test]
    fn test_decode_names_are_cumulative() {
        let table = decode("AAAAA,EAAAC").unwrap();
        let line = table.line(0).unwrap();
        assert_eq!(line[0].source.unwrap().name, Some(0));
        assert_eq!(line[1].source.unwrap().name, Some(1));
    }

    #[test]
    fn test_decode_multi_digit_value() {
        // 'gB' = 32 -> 16
        let table = decode("gBAAA").unwrap();
        assert_eq!(table.line(0).unwrap()[0].generated_column, 16);
    }

    #[test]
    fn test_decode_empty_lines() {
        let table = decode(";;AAAA").unwrap();
        assert_eq!(table.line_count(), 3);
        assert!(table.line(0).unwrap().is_empty());
        assert!(table.line(1).unwrap().is_empty());
        assert_eq!(table.line(2).unwrap().len(), 1);

        let table = decode("").unwrap();
        assert_eq!(table.line_count(), 1);
        assert_eq!(table.segment_count(), 0);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode("AA!A"),
            Err(CodecError::InvalidCharacter { character: '!', line: 0 })
        ));
        assert!(matches!(
            decode("AAAA;AA"),
            Err(CodecError::FieldCount { count: 2, line: 1 })
        ));
        assert!(matches!(decode("g"), Err(CodecError::Truncated { line: 0 })));
    }

    #[test]
    fn test_decode_sorts_unsorted_line() {
        // Second segment moves back by 4 columns
        let table = decode("IAAA,JAAC").unwrap();
        let line = table.line(0).unwrap();
        assert_eq!(line[0].generated_column, 0);
        assert_eq!(line[1].generated_column, 4);
    }

    #[test]
    fn test_encode_known_output() {
        let table = SegmentTable::from_lines(vec![
            vec![Segment::mapped(0, 0, 0, 0), Segment::mapped(9, 0, 0, 9)],
            vec![Segment::mapped(0, 0, 1, 9)],
        ]);
        assert_eq!(encode(&table), "AAAA,SAAS;AACA");
    }

    #[test]
    fn test_encode_unmapped_and_names() {
        let table = SegmentTable::from_lines(vec![vec![
            Segment::mapped(0, 0, 0, 0).with_name(0),
            Segment::unmapped(5),
            Segment::mapped(16, 0, 0, 4).with_name(1),
        ]]);
        assert_eq!(encode(&table), "AAAAA,K,WAAIC");
    }

    #[test]
    fn test_encode_empty_lines() {
        let table = SegmentTable::from_lines(vec![vec![], vec![], vec![Segment::unmapped(0)]]);
        assert_eq!(encode(&table), ";;A");
    }

    #[test]
    fn test_decode_then_encode_preserves_text() {
        let mappings = "AAAA,SAASA,GAAG;AACA,IAAI,CAACC;;AAGD,gBAAgB";
        let table = decode(mappings).unwrap();
        assert_eq!(encode(&table), mappings);
    }
}
